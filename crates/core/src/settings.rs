use chrono::Duration;

use crate::errors::{BookingError, BookingResult};

/// Shape of the fallback availability grid used when a service has no
/// explicit slots. Hours are UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSettings {
    pub workday_start_hour: u32,
    pub workday_end_hour: u32,
    pub step_minutes: i64,
    /// Length of the availability range when the caller gives no end date.
    pub default_days: i64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            workday_start_hour: 9,
            workday_end_hour: 18,
            step_minutes: 60,
            default_days: 7,
        }
    }
}

impl GridSettings {
    pub fn new(
        workday_start_hour: u32,
        workday_end_hour: u32,
        step_minutes: i64,
        default_days: i64,
    ) -> BookingResult<Self> {
        let settings = Self {
            workday_start_hour,
            workday_end_hour,
            step_minutes,
            default_days,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> BookingResult<()> {
        if self.workday_end_hour > 24 || self.workday_start_hour >= self.workday_end_hour {
            return Err(BookingError::Validation(format!(
                "Invalid working hours: {}..{}",
                self.workday_start_hour, self.workday_end_hour
            )));
        }
        if self.step_minutes <= 0 {
            return Err(BookingError::Validation(
                "Slot step must be positive".to_string(),
            ));
        }
        if self.default_days <= 0 {
            return Err(BookingError::Validation(
                "Default availability range must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn step(&self) -> Duration {
        Duration::minutes(self.step_minutes)
    }

    pub fn day_open(&self) -> Duration {
        Duration::hours(i64::from(self.workday_start_hour))
    }

    pub fn day_close(&self) -> Duration {
        Duration::hours(i64::from(self.workday_end_hour))
    }
}
