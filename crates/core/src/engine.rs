//! Booking engine: availability resolution plus the transactional
//! coordinator for appointments and time slots.

pub mod availability;
pub mod conflict;
mod mutations;
mod queries;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};
use crate::models::appointment::AppointmentDetails;
use crate::settings::GridSettings;
use crate::store::{CalendarStore, CalendarTx};

pub use conflict::ConflictSource;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone)]
pub struct BookingEngine {
    store: Arc<dyn CalendarStore>,
    settings: GridSettings,
    clock: Clock,
}

impl BookingEngine {
    pub fn new(store: Arc<dyn CalendarStore>, settings: GridSettings) -> Self {
        Self {
            store,
            settings,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replaces the wall clock used for `is_past` and default ranges.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Whether the store can open a transaction right now.
    pub async fn has_store_connection(&self) -> bool {
        self.store.begin().await.is_ok()
    }

    async fn begin(&self) -> BookingResult<Box<dyn CalendarTx>> {
        self.store.begin().await
    }
}

/// Loads an appointment with its service and option populated.
async fn load_details(tx: &mut dyn CalendarTx, appointment_id: Uuid) -> BookingResult<AppointmentDetails> {
    let appointment = tx
        .find_appointment(appointment_id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Appointment {} not found", appointment_id)))?;

    let service = tx.find_service(appointment.service_id).await?;
    let service_option = match (&service, appointment.service_option_id) {
        (Some(service), Some(option_id)) => service.option(option_id).cloned(),
        _ => None,
    };

    Ok(AppointmentDetails {
        service: service.map(|service| service.summary()),
        service_option,
        appointment,
    })
}
