//! Persistence seam for the booking engine.
//!
//! Every engine operation runs inside one [`CalendarTx`]. A transaction that
//! is dropped without [`CalendarTx::commit`] is rolled back, so an early `?`
//! return leaves no partial writes behind.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::BookingResult;
use crate::models::appointment::{Appointment, AppointmentStatus, NewAppointment};
use crate::models::service::Service;
use crate::models::time_range::TimeRange;
use crate::models::time_slot::{NewTimeSlot, TimeSlot};

pub use memory::MemoryCalendarStore;

#[async_trait]
pub trait CalendarStore: Send + Sync {
    async fn begin(&self) -> BookingResult<Box<dyn CalendarTx>>;
}

#[async_trait]
pub trait CalendarTx: Send {
    /// Serializes writers on one master's calendar until the transaction ends.
    async fn lock_master_calendar(&mut self, master_id: Uuid) -> BookingResult<()>;

    async fn find_service(&mut self, service_id: Uuid) -> BookingResult<Option<Service>>;

    async fn find_slot(&mut self, slot_id: Uuid) -> BookingResult<Option<TimeSlot>>;
    async fn find_slots(&mut self, query: &SlotQuery) -> BookingResult<Vec<TimeSlot>>;
    async fn insert_slot(&mut self, slot: NewTimeSlot) -> BookingResult<TimeSlot>;
    async fn reschedule_slot(&mut self, slot_id: Uuid, range: TimeRange) -> BookingResult<TimeSlot>;
    async fn mark_slot_booked(&mut self, slot_id: Uuid, booked: bool) -> BookingResult<()>;
    /// Books every live slot of the master whose interval equals `range`,
    /// whatever its service. Returns the number of rows touched.
    async fn book_slots_at(&mut self, master_id: Uuid, range: TimeRange) -> BookingResult<u64>;
    async fn soft_delete_slot(&mut self, slot_id: Uuid) -> BookingResult<()>;

    async fn find_appointment(&mut self, appointment_id: Uuid) -> BookingResult<Option<Appointment>>;
    async fn find_appointments(&mut self, query: &AppointmentQuery) -> BookingResult<Vec<Appointment>>;
    async fn insert_appointment(&mut self, appointment: NewAppointment) -> BookingResult<Appointment>;
    async fn update_appointment_status(
        &mut self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> BookingResult<()>;

    async fn commit(self: Box<Self>) -> BookingResult<()>;

    /// Sets the booked flag on the slot matching `slot` exactly, creating it if absent.
    async fn upsert_slot(&mut self, slot: NewTimeSlot) -> BookingResult<TimeSlot> {
        let query = SlotQuery::exact(slot.master_id, slot.range).service(slot.service_id);
        match self.find_slots(&query).await?.into_iter().next() {
            Some(mut existing) => {
                if existing.is_booked != slot.is_booked {
                    self.mark_slot_booked(existing.id, slot.is_booked).await?;
                    existing.is_booked = slot.is_booked;
                }
                Ok(existing)
            }
            None => self.insert_slot(slot).await,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotWindow {
    Any,
    Overlapping(TimeRange),
    Exact(TimeRange),
    /// Slots lying entirely inside the bounds; either bound may be open.
    Within {
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    },
}

/// Filter over live (not soft-deleted) slots of one master.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotQuery {
    pub master_id: Uuid,
    pub window: SlotWindow,
    pub service_id: Option<Uuid>,
    pub booked: Option<bool>,
    pub exclude_id: Option<Uuid>,
}

impl SlotQuery {
    pub fn for_master(master_id: Uuid) -> Self {
        Self {
            master_id,
            window: SlotWindow::Any,
            service_id: None,
            booked: None,
            exclude_id: None,
        }
    }

    pub fn overlapping(master_id: Uuid, range: TimeRange) -> Self {
        Self {
            window: SlotWindow::Overlapping(range),
            ..Self::for_master(master_id)
        }
    }

    pub fn exact(master_id: Uuid, range: TimeRange) -> Self {
        Self {
            window: SlotWindow::Exact(range),
            ..Self::for_master(master_id)
        }
    }

    pub fn within(master_id: Uuid, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self {
            window: SlotWindow::Within { from, to },
            ..Self::for_master(master_id)
        }
    }

    pub fn service(mut self, service_id: Uuid) -> Self {
        self.service_id = Some(service_id);
        self
    }

    pub fn booked(mut self, booked: bool) -> Self {
        self.booked = Some(booked);
        self
    }

    pub fn excluding(mut self, slot_id: Uuid) -> Self {
        self.exclude_id = Some(slot_id);
        self
    }

    pub fn matches(&self, slot: &TimeSlot) -> bool {
        if slot.is_deleted() || slot.master_id != self.master_id {
            return false;
        }
        if self.service_id.is_some_and(|id| id != slot.service_id)
            || self.booked.is_some_and(|booked| booked != slot.is_booked)
            || self.exclude_id == Some(slot.id)
        {
            return false;
        }

        match self.window {
            SlotWindow::Any => true,
            SlotWindow::Overlapping(range) => range.overlaps(&slot.range()),
            SlotWindow::Exact(range) => range == slot.range(),
            SlotWindow::Within { from, to } => {
                from.is_none_or(|from| slot.start_time >= from)
                    && to.is_none_or(|to| slot.end_time <= to)
            }
        }
    }
}

/// Filter over live (not soft-deleted) appointments. An empty `statuses`
/// list matches every status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentQuery {
    pub master_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub overlapping: Option<TimeRange>,
    pub statuses: Vec<AppointmentStatus>,
    pub exclude_id: Option<Uuid>,
}

impl AppointmentQuery {
    /// Pending and confirmed appointments of a master.
    pub fn active_for_master(master_id: Uuid) -> Self {
        Self {
            master_id: Some(master_id),
            statuses: AppointmentStatus::ACTIVE.to_vec(),
            ..Self::default()
        }
    }

    pub fn overlapping(mut self, range: TimeRange) -> Self {
        self.overlapping = Some(range);
        self
    }

    pub fn service(mut self, service_id: Uuid) -> Self {
        self.service_id = Some(service_id);
        self
    }

    pub fn excluding(mut self, appointment_id: Uuid) -> Self {
        self.exclude_id = Some(appointment_id);
        self
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        appointment.deleted_at.is_none()
            && self.master_id.is_none_or(|id| id == appointment.master_id)
            && self.user_id.is_none_or(|id| id == appointment.user_id)
            && self.service_id.is_none_or(|id| id == appointment.service_id)
            && self.exclude_id != Some(appointment.id)
            && (self.statuses.is_empty() || self.statuses.contains(&appointment.status))
            && self
                .overlapping
                .is_none_or(|range| range.overlaps(&appointment.range()))
    }
}
