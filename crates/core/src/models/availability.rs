use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time_range::TimeRange;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    /// Set when the window comes from a persisted slot rather than the grid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub available: bool,
    pub is_booked: bool,
    pub is_past: bool,
}

impl AvailabilityWindow {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityQuery {
    pub master_id: Uuid,
    pub service_id: Uuid,
    pub service_option_id: Option<Uuid>,
    pub range: TimeRange,
}
