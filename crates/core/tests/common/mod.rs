#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use fake::Fake;
use fake::faker::lorem::en::Word;
use timebook_core::BookingEngine;
use timebook_core::models::appointment::BookingRequest;
use timebook_core::models::service::{Service, ServiceOption};
use timebook_core::settings::GridSettings;
use timebook_core::store::MemoryCalendarStore;
use uuid::Uuid;

pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0)
        .single()
        .expect("valid test timestamp")
}

pub fn service(master_id: Uuid, duration_minutes: i32) -> Service {
    Service {
        id: Uuid::new_v4(),
        master_id,
        name: Word().fake(),
        duration_minutes,
        price: (10.0..200.0).fake(),
        options: Vec::new(),
    }
}

pub fn with_option(mut service: Service, duration_minutes: i32) -> (Service, ServiceOption) {
    let option = ServiceOption {
        id: Uuid::new_v4(),
        service_id: service.id,
        name: Word().fake(),
        duration_minutes,
        price: (10.0..200.0).fake(),
    };
    service.options.push(option.clone());
    (service, option)
}

pub fn booking(user_id: Uuid, service: &Service, start: DateTime<Utc>) -> BookingRequest {
    BookingRequest {
        user_id,
        master_id: service.master_id,
        service_id: service.id,
        service_option_id: None,
        start,
        notes: String::new(),
    }
}

pub struct Fixture {
    pub store: MemoryCalendarStore,
    pub engine: BookingEngine,
    pub master_id: Uuid,
}

/// Engine over an empty in-memory store whose clock reads 2024-01-01 00:00 UTC.
pub fn fixture() -> Fixture {
    let store = MemoryCalendarStore::new();
    let engine = BookingEngine::new(Arc::new(store.clone()), GridSettings::default())
        .with_clock(|| at(1, 0, 0));
    Fixture {
        store,
        engine,
        master_id: Uuid::new_v4(),
    }
}

impl Fixture {
    pub async fn add_service(&self, duration_minutes: i32) -> Service {
        let service = service(self.master_id, duration_minutes);
        self.store.insert_service(service.clone()).await;
        service
    }
}
