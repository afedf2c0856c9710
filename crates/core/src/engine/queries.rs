use chrono::Duration;
use tracing::debug;
use uuid::Uuid;

use super::availability::{Candidate, MAX_QUERY_DAYS, generate_grid, resolve_windows};
use super::conflict::find_booking_conflict;
use super::BookingEngine;
use crate::errors::{BookingError, BookingResult};
use crate::models::appointment::{Appointment, AppointmentListFilter};
use crate::models::availability::{AvailabilityQuery, AvailabilityWindow};
use crate::models::caller::CallerScope;
use crate::models::time_range::TimeRange;
use crate::models::time_slot::{SlotListFilter, TimeSlot};
use crate::store::{AppointmentQuery, SlotQuery};

impl BookingEngine {
    /// Bookable windows for one service of one master.
    ///
    /// Persisted slots of the service inside the range are used when any
    /// exist; otherwise a grid is generated from the working hours. Either
    /// way a window is booked if anything on the master's calendar overlaps
    /// it, whatever the service.
    pub async fn get_availability(&self, query: AvailabilityQuery) -> BookingResult<Vec<AvailabilityWindow>> {
        let range = TimeRange::checked(query.range.start, query.range.end)?;
        if range.duration() > Duration::days(MAX_QUERY_DAYS) {
            return Err(BookingError::Validation(format!(
                "Date range may not exceed {} days",
                MAX_QUERY_DAYS
            )));
        }

        // Read-only; the transaction is dropped without commit.
        let mut tx = self.begin().await?;

        let service = tx
            .find_service(query.service_id)
            .await?
            .filter(|service| service.master_id == query.master_id)
            .ok_or_else(|| {
                BookingError::NotFound(format!(
                    "Service {} not found for master {}",
                    query.service_id, query.master_id
                ))
            })?;
        let duration = service.window_duration(query.service_option_id)?;

        let explicit = tx
            .find_slots(
                &SlotQuery::within(query.master_id, Some(range.start), Some(range.end))
                    .service(service.id),
            )
            .await?;

        let candidates: Vec<Candidate> = if explicit.is_empty() {
            generate_grid(&range, duration, &self.settings)
                .into_iter()
                .map(Candidate::generated)
                .collect()
        } else {
            explicit
                .iter()
                .map(|slot| Candidate {
                    slot_id: Some(slot.id),
                    range: slot.range(),
                    is_booked: slot.is_booked,
                })
                .collect()
        };

        let mut blocked: Vec<TimeRange> = tx
            .find_slots(&SlotQuery::overlapping(query.master_id, range).booked(true))
            .await?
            .iter()
            .map(TimeSlot::range)
            .collect();
        blocked.extend(
            tx.find_appointments(&AppointmentQuery::active_for_master(query.master_id).overlapping(range))
                .await?
                .iter()
                .map(Appointment::range),
        );

        let windows = resolve_windows(candidates, &blocked, &range, self.now());
        debug!(
            master_id = %query.master_id,
            service_id = %query.service_id,
            explicit = !explicit.is_empty(),
            windows = windows.len(),
            "Resolved availability"
        );
        Ok(windows)
    }

    /// Whether `range` collides with the master's calendar. Advisory only:
    /// mutations repeat the check under the master's lock.
    pub async fn has_conflict(
        &self,
        master_id: Uuid,
        range: TimeRange,
        exclude_appointment: Option<Uuid>,
    ) -> BookingResult<bool> {
        let mut tx = self.begin().await?;
        let conflict = find_booking_conflict(tx.as_mut(), master_id, range, exclude_appointment).await?;
        Ok(conflict.is_some())
    }

    /// Default availability range: from now for the configured number of days.
    pub fn default_range(&self) -> TimeRange {
        let now = self.now();
        TimeRange::new(now, now + Duration::days(self.settings.default_days))
    }

    pub async fn list_slots(&self, master_id: Uuid, filter: SlotListFilter) -> BookingResult<Vec<TimeSlot>> {
        let mut query = SlotQuery::within(master_id, filter.from, filter.to);
        query.service_id = filter.service_id;
        query.booked = filter.booked;

        let mut tx = self.begin().await?;
        tx.find_slots(&query).await
    }

    /// Appointments visible to the caller: a client's own bookings, a master's
    /// calendar, or anything for an admin.
    pub async fn list_appointments(
        &self,
        scope: CallerScope,
        filter: AppointmentListFilter,
    ) -> BookingResult<Vec<Appointment>> {
        let mut query = AppointmentQuery {
            statuses: filter.status.into_iter().collect(),
            ..AppointmentQuery::default()
        };
        match scope {
            CallerScope::Client(user_id) => {
                query.user_id = Some(user_id);
                query.master_id = filter.master_id;
            }
            CallerScope::Master(master_id) => query.master_id = Some(master_id),
            CallerScope::Admin => query.master_id = filter.master_id,
        }

        let mut tx = self.begin().await?;
        tx.find_appointments(&query).await
    }
}
