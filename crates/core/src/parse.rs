//! Parsing of caller-supplied timestamps.
//!
//! Accepted forms are RFC 3339 (`2024-05-10T10:00:00Z`), and the naive
//! `YYYY-MM-DDTHH:MM:SS` and `YYYY-MM-DD HH:MM:SS` forms, which are read as
//! UTC. Range bounds additionally accept a bare `YYYY-MM-DD` date.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::errors::{BookingError, BookingResult};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Start,
    End,
}

pub fn parse_instant(input: &str) -> BookingResult<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| BookingError::Validation(format!("Invalid time format: {}", input)))
}

/// Parses one end of a query range. A bare date as `Start` means midnight of
/// that day; as `End` it means the end of that day.
pub fn parse_range_bound(input: &str, bound: RangeBound) -> BookingResult<DateTime<Utc>> {
    if let Ok(instant) = parse_instant(input) {
        return Ok(instant);
    }

    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| BookingError::Validation(format!("Invalid date format: {}", input)))?;
    let midnight = date.and_time(NaiveTime::MIN).and_utc();

    Ok(match bound {
        RangeBound::Start => midnight,
        RangeBound::End => midnight + Duration::days(1),
    })
}
