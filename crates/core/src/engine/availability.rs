use chrono::{Duration, NaiveTime};
use uuid::Uuid;

use crate::models::availability::AvailabilityWindow;
use crate::models::time_range::TimeRange;
use crate::settings::GridSettings;

/// Widest range a single availability query may span.
pub const MAX_QUERY_DAYS: i64 = 366;

/// A window before booked-state resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub slot_id: Option<Uuid>,
    pub range: TimeRange,
    pub is_booked: bool,
}

impl Candidate {
    pub fn generated(range: TimeRange) -> Self {
        Self {
            slot_id: None,
            range,
            is_booked: false,
        }
    }
}

/// Fallback grid of windows of length `duration` for each UTC day in `range`.
///
/// Windows start at the working-day opening and advance by the larger of the
/// configured step and `duration`, so generated windows never overlap. Only
/// windows lying wholly inside both the working day and `range` are kept.
pub fn generate_grid(range: &TimeRange, duration: Duration, settings: &GridSettings) -> Vec<TimeRange> {
    let step = settings.step().max(duration);
    let mut windows = Vec::new();
    if step <= Duration::zero() {
        return windows;
    }

    let last_day = range.end.date_naive();
    let mut day = range.start.date_naive();
    while day <= last_day {
        let midnight = day.and_time(NaiveTime::MIN).and_utc();
        let close = midnight + settings.day_close();
        let mut cursor = midnight + settings.day_open();

        while cursor + duration <= close {
            let window = TimeRange::starting_at(cursor, duration);
            if range.contains(&window) {
                windows.push(window);
            }
            cursor += step;
        }

        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    windows
}

/// Resolves candidates into the availability answer.
///
/// A window is booked when its own slot is booked or when it overlaps any
/// of `blocked`. Empty windows and windows outside `range` are dropped, and
/// candidates sharing an interval collapse into one. Output is ordered by
/// `(start, end)`.
pub fn resolve_windows(
    candidates: Vec<Candidate>,
    blocked: &[TimeRange],
    range: &TimeRange,
    now: chrono::DateTime<chrono::Utc>,
) -> Vec<AvailabilityWindow> {
    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if candidate.range.is_empty() || !range.contains(&candidate.range) {
            continue;
        }
        match kept.iter_mut().find(|existing| existing.range == candidate.range) {
            Some(existing) => {
                existing.is_booked |= candidate.is_booked;
                existing.slot_id = existing.slot_id.or(candidate.slot_id);
            }
            None => kept.push(candidate),
        }
    }

    let mut windows: Vec<AvailabilityWindow> = kept
        .into_iter()
        .map(|candidate| {
            let is_booked = candidate.is_booked
                || blocked.iter().any(|span| span.overlaps(&candidate.range));
            let is_past = candidate.range.start < now;
            AvailabilityWindow {
                slot_id: candidate.slot_id,
                start_time: candidate.range.start,
                end_time: candidate.range.end,
                available: !is_booked && !is_past,
                is_booked,
                is_past,
            }
        })
        .collect();

    windows.sort_by_key(|window| (window.start_time, window.end_time));
    windows
}
