use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time_range::TimeRange;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: Uuid,
    pub master_id: Uuid,
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_booked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TimeSlot {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Slot row to be written by a store; ids and timestamps are assigned there.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimeSlot {
    pub master_id: Uuid,
    pub service_id: Uuid,
    pub range: TimeRange,
    pub is_booked: bool,
}

/// Identifies the slot a toggle applies to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlotRef {
    Id(Uuid),
    /// Creates the slot when no row matches the interval exactly.
    Interval { service_id: Uuid, range: TimeRange },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotListFilter {
    pub service_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub booked: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTimeSlotRequest {
    pub service_id: Uuid,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTimeSlotRequest {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleTimeSlotRequest {
    pub service_id: Option<Uuid>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_booked: bool,
}
