use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use timebook_core::errors::{BookingError, BookingResult};
use timebook_core::models::appointment::{Appointment, AppointmentStatus, NewAppointment};
use timebook_core::models::service::Service;
use timebook_core::models::time_range::TimeRange;
use timebook_core::models::time_slot::{NewTimeSlot, TimeSlot};
use timebook_core::store::{AppointmentQuery, CalendarStore, CalendarTx, SlotQuery};
use tracing::debug;
use uuid::Uuid;

use crate::DbPool;
use crate::repositories::{appointment, service, time_slot};
use crate::schema::ACTIVE_APPOINTMENT_INDEX;

const UNIQUE_VIOLATION: &str = "23505";

/// Postgres-backed calendar. Each engine operation runs in one database
/// transaction that rolls back when dropped uncommitted.
#[derive(Debug, Clone)]
pub struct PgCalendarStore {
    pool: DbPool,
}

impl PgCalendarStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl CalendarStore for PgCalendarStore {
    async fn begin(&self) -> BookingResult<Box<dyn CalendarTx>> {
        let tx = self.pool.begin().await.map_err(|err| db_error(err.into()))?;
        Ok(Box::new(PgCalendarTx { tx }))
    }
}

pub struct PgCalendarTx {
    tx: Transaction<'static, Postgres>,
}

/// Maps a repository failure into the booking taxonomy. Losing a race on the
/// active-interval unique index is a conflict, not an internal error.
pub(crate) fn db_error(report: eyre::Report) -> BookingError {
    if let Some(sqlx::Error::Database(db)) = report.downcast_ref::<sqlx::Error>() {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION)
            && db.constraint() == Some(ACTIVE_APPOINTMENT_INDEX)
        {
            return BookingError::Conflict(
                "An active appointment already occupies this interval".to_string(),
            );
        }
    }
    BookingError::Database(report)
}

fn missing(kind: &str, id: Uuid) -> BookingError {
    BookingError::NotFound(format!("{} {} not found", kind, id))
}

#[async_trait]
impl CalendarTx for PgCalendarTx {
    async fn lock_master_calendar(&mut self, master_id: Uuid) -> BookingResult<()> {
        debug!(%master_id, "Taking calendar lock");
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text))")
            .bind(master_id)
            .execute(&mut *self.tx)
            .await
            .map_err(|err| db_error(err.into()))?;
        Ok(())
    }

    async fn find_service(&mut self, service_id: Uuid) -> BookingResult<Option<Service>> {
        let Some(row) = service::get_service_by_id(&mut self.tx, service_id)
            .await
            .map_err(db_error)?
        else {
            return Ok(None);
        };
        let options = service::get_options_by_service_id(&mut self.tx, service_id)
            .await
            .map_err(db_error)?;
        Ok(Some(row.into_service(options)))
    }

    async fn find_slot(&mut self, slot_id: Uuid) -> BookingResult<Option<TimeSlot>> {
        let row = time_slot::get_time_slot_by_id(&mut self.tx, slot_id)
            .await
            .map_err(db_error)?;
        Ok(row.map(TimeSlot::from))
    }

    async fn find_slots(&mut self, query: &SlotQuery) -> BookingResult<Vec<TimeSlot>> {
        let rows = time_slot::find_time_slots(&mut self.tx, query)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(TimeSlot::from).collect())
    }

    async fn insert_slot(&mut self, slot: NewTimeSlot) -> BookingResult<TimeSlot> {
        let row = time_slot::create_time_slot(
            &mut self.tx,
            slot.master_id,
            slot.service_id,
            slot.range.start,
            slot.range.end,
            slot.is_booked,
        )
        .await
        .map_err(db_error)?;
        Ok(row.into())
    }

    async fn reschedule_slot(&mut self, slot_id: Uuid, range: TimeRange) -> BookingResult<TimeSlot> {
        time_slot::update_time_slot_range(&mut self.tx, slot_id, range.start, range.end)
            .await
            .map_err(db_error)?
            .map(TimeSlot::from)
            .ok_or_else(|| missing("Time slot", slot_id))
    }

    async fn mark_slot_booked(&mut self, slot_id: Uuid, booked: bool) -> BookingResult<()> {
        let touched = time_slot::set_time_slot_booked(&mut self.tx, slot_id, booked)
            .await
            .map_err(db_error)?;
        if touched == 0 {
            return Err(missing("Time slot", slot_id));
        }
        Ok(())
    }

    async fn book_slots_at(&mut self, master_id: Uuid, range: TimeRange) -> BookingResult<u64> {
        time_slot::book_time_slots_at(&mut self.tx, master_id, range.start, range.end)
            .await
            .map_err(db_error)
    }

    async fn soft_delete_slot(&mut self, slot_id: Uuid) -> BookingResult<()> {
        let touched = time_slot::soft_delete_time_slot(&mut self.tx, slot_id)
            .await
            .map_err(db_error)?;
        if touched == 0 {
            return Err(missing("Time slot", slot_id));
        }
        Ok(())
    }

    async fn find_appointment(&mut self, appointment_id: Uuid) -> BookingResult<Option<Appointment>> {
        appointment::get_appointment_by_id(&mut self.tx, appointment_id)
            .await
            .map_err(db_error)?
            .map(Appointment::try_from)
            .transpose()
    }

    async fn find_appointments(&mut self, query: &AppointmentQuery) -> BookingResult<Vec<Appointment>> {
        appointment::find_appointments(&mut self.tx, query)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(Appointment::try_from)
            .collect()
    }

    async fn insert_appointment(&mut self, new: NewAppointment) -> BookingResult<Appointment> {
        appointment::create_appointment(&mut self.tx, &new)
            .await
            .map_err(db_error)?
            .try_into()
    }

    async fn update_appointment_status(
        &mut self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> BookingResult<()> {
        let touched = appointment::update_appointment_status(&mut self.tx, appointment_id, status)
            .await
            .map_err(db_error)?;
        if touched == 0 {
            return Err(missing("Appointment", appointment_id));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> BookingResult<()> {
        self.tx.commit().await.map_err(|err| db_error(err.into()))
    }
}
