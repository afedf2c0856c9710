use std::fmt;

use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};
use crate::models::time_range::TimeRange;
use crate::store::{AppointmentQuery, CalendarTx, SlotQuery};

/// What an interval collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictSource {
    Appointment(Uuid),
    BlockedSlot(Uuid),
    Slot(Uuid),
}

impl fmt::Display for ConflictSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictSource::Appointment(id) => write!(f, "overlaps appointment {}", id),
            ConflictSource::BlockedSlot(id) => write!(f, "overlaps blocked time slot {}", id),
            ConflictSource::Slot(id) => write!(f, "overlaps time slot {}", id),
        }
    }
}

impl From<ConflictSource> for BookingError {
    fn from(source: ConflictSource) -> Self {
        BookingError::Conflict(format!("Requested time {}", source))
    }
}

/// Calendar-wide check for a new or moved appointment: any pending or
/// confirmed appointment of the master, or any booked slot of the master,
/// overlapping `range` blocks it regardless of service.
pub(crate) async fn find_booking_conflict(
    tx: &mut dyn CalendarTx,
    master_id: Uuid,
    range: TimeRange,
    exclude_appointment: Option<Uuid>,
) -> BookingResult<Option<ConflictSource>> {
    let mut query = AppointmentQuery::active_for_master(master_id).overlapping(range);
    query.exclude_id = exclude_appointment;
    if let Some(appointment) = tx.find_appointments(&query).await?.first() {
        return Ok(Some(ConflictSource::Appointment(appointment.id)));
    }

    let blocked = SlotQuery::overlapping(master_id, range).booked(true);
    if let Some(slot) = tx.find_slots(&blocked).await?.first() {
        return Ok(Some(ConflictSource::BlockedSlot(slot.id)));
    }

    Ok(None)
}

/// Check for declaring a slot: only slots and active appointments of the
/// same service count.
pub(crate) async fn find_slot_conflict(
    tx: &mut dyn CalendarTx,
    master_id: Uuid,
    service_id: Uuid,
    range: TimeRange,
    exclude_slot: Option<Uuid>,
) -> BookingResult<Option<ConflictSource>> {
    let mut slots = SlotQuery::overlapping(master_id, range).service(service_id);
    slots.exclude_id = exclude_slot;
    if let Some(slot) = tx.find_slots(&slots).await?.first() {
        return Ok(Some(ConflictSource::Slot(slot.id)));
    }

    let appointments = AppointmentQuery::active_for_master(master_id)
        .service(service_id)
        .overlapping(range);
    if let Some(appointment) = tx.find_appointments(&appointments).await?.first() {
        return Ok(Some(ConflictSource::Appointment(appointment.id)));
    }

    Ok(None)
}
