use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::service::{ServiceOption, ServiceSummary};
use super::time_range::TimeRange;
use crate::errors::BookingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
}

impl AppointmentStatus {
    /// Statuses that occupy the master's calendar.
    pub const ACTIVE: [AppointmentStatus; 2] =
        [AppointmentStatus::Pending, AppointmentStatus::Confirmed];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Rejected => "rejected",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "rejected" => Ok(AppointmentStatus::Rejected),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(BookingError::Validation(format!(
                "Unknown appointment status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub master_id: Uuid,
    pub service_id: Uuid,
    pub service_option_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub user_id: Uuid,
    pub master_id: Uuid,
    pub service_id: Uuid,
    pub service_option_id: Option<Uuid>,
    pub range: TimeRange,
    pub status: AppointmentStatus,
    pub notes: String,
}

/// Appointment with its service and option populated, as returned from mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDetails {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub service: Option<ServiceSummary>,
    pub service_option: Option<ServiceOption>,
}

/// Input to the booking coordinator. The end is derived from the service duration.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub user_id: Uuid,
    pub master_id: Uuid,
    pub service_id: Uuid,
    pub service_option_id: Option<Uuid>,
    pub start: DateTime<Utc>,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub master_id: Uuid,
    pub service_id: Uuid,
    pub service_option_id: Option<Uuid>,
    pub start_time: String,
    pub notes: Option<String>,
}

/// Body for a master booking a client into their own calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClientAppointmentRequest {
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub service_option_id: Option<Uuid>,
    pub start_time: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentListFilter {
    pub master_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
}
