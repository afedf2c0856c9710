use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};

/// A bookable offering. When `options` is non-empty one of them must be
/// chosen and its duration wins over the service's own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub master_id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub price: f64,
    #[serde(default)]
    pub options: Vec<ServiceOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOption {
    pub id: Uuid,
    pub service_id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub price: f64,
}

impl Service {
    pub fn option(&self, option_id: Uuid) -> Option<&ServiceOption> {
        self.options.iter().find(|option| option.id == option_id)
    }

    pub fn summary(&self) -> ServiceSummary {
        ServiceSummary {
            id: self.id,
            name: self.name.clone(),
            duration_minutes: self.duration_minutes,
            price: self.price,
        }
    }

    /// Duration used when booking this service.
    ///
    /// Fails with `Validation` when options exist but none was chosen or the
    /// duration is not positive, and with `NotFound` for an unknown option.
    pub fn booking_duration(&self, option_id: Option<Uuid>) -> BookingResult<Duration> {
        let minutes = match option_id {
            Some(option_id) => self.known_option(option_id)?.duration_minutes,
            None if !self.options.is_empty() => {
                return Err(BookingError::Validation(format!(
                    "Service {} requires a service option",
                    self.id
                )));
            }
            None => self.duration_minutes,
        };

        if minutes <= 0 {
            return Err(BookingError::Validation(format!(
                "Service {} has no bookable duration",
                self.id
            )));
        }

        Ok(Duration::minutes(i64::from(minutes)))
    }

    /// Duration used to shape availability windows. Unlike booking, a missing
    /// option falls back to the service duration and a degenerate duration is
    /// passed through so the resolver can drop the resulting windows.
    pub fn window_duration(&self, option_id: Option<Uuid>) -> BookingResult<Duration> {
        let minutes = match option_id {
            Some(option_id) => self.known_option(option_id)?.duration_minutes,
            None => self.duration_minutes,
        };
        Ok(Duration::minutes(i64::from(minutes.max(0))))
    }

    fn known_option(&self, option_id: Uuid) -> BookingResult<&ServiceOption> {
        self.option(option_id).ok_or_else(|| {
            BookingError::NotFound(format!(
                "Service option {} not found for service {}",
                option_id, self.id
            ))
        })
    }
}
