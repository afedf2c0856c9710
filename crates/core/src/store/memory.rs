//! In-process calendar store.
//!
//! Transactions hold the whole store lock from `begin` to commit or drop and
//! work on a private copy, so they are fully serialized and a dropped
//! transaction leaves the shared state untouched.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use eyre::eyre;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{AppointmentQuery, CalendarStore, CalendarTx, SlotQuery};
use crate::errors::{BookingError, BookingResult};
use crate::models::appointment::{Appointment, AppointmentStatus, NewAppointment};
use crate::models::service::Service;
use crate::models::time_range::TimeRange;
use crate::models::time_slot::{NewTimeSlot, TimeSlot};

/// Store operations that can be made to fail once, for exercising rollback paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    Begin,
    InsertSlot,
    MarkSlotBooked,
    InsertAppointment,
    UpdateAppointmentStatus,
    Commit,
}

#[derive(Debug, Clone, Default)]
struct CalendarData {
    services: HashMap<Uuid, Service>,
    slots: HashMap<Uuid, TimeSlot>,
    appointments: HashMap<Uuid, Appointment>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCalendarStore {
    data: Arc<Mutex<CalendarData>>,
    fail_points: Arc<StdMutex<HashSet<FailPoint>>>,
}

impl MemoryCalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_service(&self, service: Service) {
        self.data.lock().await.services.insert(service.id, service);
    }

    /// Writes a slot as-is, without any interval checks.
    pub async fn seed_slot(&self, slot: TimeSlot) {
        self.data.lock().await.slots.insert(slot.id, slot);
    }

    pub async fn seed_appointment(&self, appointment: Appointment) {
        self.data
            .lock()
            .await
            .appointments
            .insert(appointment.id, appointment);
    }

    /// All slots including soft-deleted ones, ordered by start.
    pub async fn slots(&self) -> Vec<TimeSlot> {
        let mut slots: Vec<TimeSlot> = self.data.lock().await.slots.values().cloned().collect();
        slots.sort_by_key(|slot| (slot.start_time, slot.end_time, slot.created_at));
        slots
    }

    pub async fn appointments(&self) -> Vec<Appointment> {
        let mut appointments: Vec<Appointment> =
            self.data.lock().await.appointments.values().cloned().collect();
        appointments.sort_by_key(|appointment| (appointment.start_time, appointment.created_at));
        appointments
    }

    /// Makes the next call at `point` fail with a database error.
    pub fn fail_at(&self, point: FailPoint) {
        self.fail_points
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(point);
    }
}

fn trip(fail_points: &StdMutex<HashSet<FailPoint>>, point: FailPoint) -> BookingResult<()> {
    let tripped = fail_points
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&point);
    if tripped {
        return Err(BookingError::Database(eyre!("injected failure at {:?}", point)));
    }
    Ok(())
}

#[async_trait]
impl CalendarStore for MemoryCalendarStore {
    async fn begin(&self) -> BookingResult<Box<dyn CalendarTx>> {
        trip(&self.fail_points, FailPoint::Begin)?;
        let guard = self.data.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx {
            guard,
            working,
            fail_points: self.fail_points.clone(),
        }))
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<CalendarData>,
    working: CalendarData,
    fail_points: Arc<StdMutex<HashSet<FailPoint>>>,
}

impl MemoryTx {
    fn trip(&self, point: FailPoint) -> BookingResult<()> {
        trip(&self.fail_points, point)
    }

    fn live_slot_mut(&mut self, slot_id: Uuid) -> BookingResult<&mut TimeSlot> {
        self.working
            .slots
            .get_mut(&slot_id)
            .filter(|slot| !slot.is_deleted())
            .ok_or_else(|| BookingError::NotFound(format!("Time slot {} not found", slot_id)))
    }
}

#[async_trait]
impl CalendarTx for MemoryTx {
    async fn lock_master_calendar(&mut self, _master_id: Uuid) -> BookingResult<()> {
        // The store lock is already held for the whole transaction.
        Ok(())
    }

    async fn find_service(&mut self, service_id: Uuid) -> BookingResult<Option<Service>> {
        Ok(self.working.services.get(&service_id).cloned())
    }

    async fn find_slot(&mut self, slot_id: Uuid) -> BookingResult<Option<TimeSlot>> {
        Ok(self
            .working
            .slots
            .get(&slot_id)
            .filter(|slot| !slot.is_deleted())
            .cloned())
    }

    async fn find_slots(&mut self, query: &SlotQuery) -> BookingResult<Vec<TimeSlot>> {
        let mut slots: Vec<TimeSlot> = self
            .working
            .slots
            .values()
            .filter(|slot| query.matches(slot))
            .cloned()
            .collect();
        slots.sort_by_key(|slot| (slot.start_time, slot.end_time, slot.created_at));
        Ok(slots)
    }

    async fn insert_slot(&mut self, slot: NewTimeSlot) -> BookingResult<TimeSlot> {
        self.trip(FailPoint::InsertSlot)?;
        let now = Utc::now();
        let slot = TimeSlot {
            id: Uuid::new_v4(),
            master_id: slot.master_id,
            service_id: slot.service_id,
            start_time: slot.range.start,
            end_time: slot.range.end,
            is_booked: slot.is_booked,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.working.slots.insert(slot.id, slot.clone());
        Ok(slot)
    }

    async fn reschedule_slot(&mut self, slot_id: Uuid, range: TimeRange) -> BookingResult<TimeSlot> {
        let slot = self.live_slot_mut(slot_id)?;
        slot.start_time = range.start;
        slot.end_time = range.end;
        slot.updated_at = Utc::now();
        Ok(slot.clone())
    }

    async fn mark_slot_booked(&mut self, slot_id: Uuid, booked: bool) -> BookingResult<()> {
        self.trip(FailPoint::MarkSlotBooked)?;
        let slot = self.live_slot_mut(slot_id)?;
        slot.is_booked = booked;
        slot.updated_at = Utc::now();
        Ok(())
    }

    async fn book_slots_at(&mut self, master_id: Uuid, range: TimeRange) -> BookingResult<u64> {
        let query = SlotQuery::exact(master_id, range);
        let now = Utc::now();
        let mut touched = 0;
        for slot in self.working.slots.values_mut() {
            if query.matches(slot) {
                slot.is_booked = true;
                slot.updated_at = now;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn soft_delete_slot(&mut self, slot_id: Uuid) -> BookingResult<()> {
        let slot = self.live_slot_mut(slot_id)?;
        let now = Utc::now();
        slot.deleted_at = Some(now);
        slot.updated_at = now;
        Ok(())
    }

    async fn find_appointment(&mut self, appointment_id: Uuid) -> BookingResult<Option<Appointment>> {
        Ok(self
            .working
            .appointments
            .get(&appointment_id)
            .filter(|appointment| appointment.deleted_at.is_none())
            .cloned())
    }

    async fn find_appointments(&mut self, query: &AppointmentQuery) -> BookingResult<Vec<Appointment>> {
        let mut appointments: Vec<Appointment> = self
            .working
            .appointments
            .values()
            .filter(|appointment| query.matches(appointment))
            .cloned()
            .collect();
        appointments.sort_by_key(|appointment| (appointment.start_time, appointment.created_at));
        Ok(appointments)
    }

    async fn insert_appointment(&mut self, appointment: NewAppointment) -> BookingResult<Appointment> {
        self.trip(FailPoint::InsertAppointment)?;

        // Mirrors the partial unique index on active intervals in Postgres.
        let duplicate = appointment.status.is_active()
            && self.working.appointments.values().any(|existing| {
                existing.deleted_at.is_none()
                    && existing.status.is_active()
                    && existing.master_id == appointment.master_id
                    && existing.range() == appointment.range
            });
        if duplicate {
            return Err(BookingError::Conflict(
                "An active appointment already occupies this interval".to_string(),
            ));
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            user_id: appointment.user_id,
            master_id: appointment.master_id,
            service_id: appointment.service_id,
            service_option_id: appointment.service_option_id,
            start_time: appointment.range.start,
            end_time: appointment.range.end,
            status: appointment.status,
            notes: appointment.notes,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.working
            .appointments
            .insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update_appointment_status(
        &mut self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> BookingResult<()> {
        self.trip(FailPoint::UpdateAppointmentStatus)?;
        let appointment = self
            .working
            .appointments
            .get_mut(&appointment_id)
            .filter(|appointment| appointment.deleted_at.is_none())
            .ok_or_else(|| {
                BookingError::NotFound(format!("Appointment {} not found", appointment_id))
            })?;
        appointment.status = status;
        appointment.updated_at = Utc::now();
        Ok(())
    }

    async fn commit(self: Box<Self>) -> BookingResult<()> {
        self.trip(FailPoint::Commit)?;
        let MemoryTx {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }
}
