use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use timebook_core::errors::BookingError;
use timebook_core::models::appointment::Appointment;
use timebook_core::models::service::{Service, ServiceOption};
use timebook_core::models::time_slot::TimeSlot;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbService {
    pub id: Uuid,
    pub master_id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbServiceOption {
    pub id: Uuid,
    pub service_id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTimeSlot {
    pub id: Uuid,
    pub master_id: Uuid,
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_booked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub master_id: Uuid,
    pub service_id: Uuid,
    pub service_option_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl DbService {
    pub fn into_service(self, options: Vec<DbServiceOption>) -> Service {
        Service {
            id: self.id,
            master_id: self.master_id,
            name: self.name,
            duration_minutes: self.duration_minutes,
            price: self.price,
            options: options.into_iter().map(ServiceOption::from).collect(),
        }
    }
}

impl From<DbServiceOption> for ServiceOption {
    fn from(row: DbServiceOption) -> Self {
        ServiceOption {
            id: row.id,
            service_id: row.service_id,
            name: row.name,
            duration_minutes: row.duration_minutes,
            price: row.price,
        }
    }
}

impl From<DbTimeSlot> for TimeSlot {
    fn from(row: DbTimeSlot) -> Self {
        TimeSlot {
            id: row.id,
            master_id: row.master_id,
            service_id: row.service_id,
            start_time: row.start_time,
            end_time: row.end_time,
            is_booked: row.is_booked,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

impl TryFrom<DbAppointment> for Appointment {
    type Error = BookingError;

    fn try_from(row: DbAppointment) -> Result<Self, Self::Error> {
        Ok(Appointment {
            id: row.id,
            user_id: row.user_id,
            master_id: row.master_id,
            service_id: row.service_id,
            service_option_id: row.service_option_id,
            start_time: row.start_time,
            end_time: row.end_time,
            status: row.status.parse().map_err(|_| {
                BookingError::Database(eyre::eyre!(
                    "appointment {} has unknown status {:?}",
                    row.id,
                    row.status
                ))
            })?,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}
