use crate::models::DbAppointment;
use chrono::Utc;
use eyre::Result;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use timebook_core::models::appointment::{AppointmentStatus, NewAppointment};
use timebook_core::store::AppointmentQuery;
use uuid::Uuid;

const APPOINTMENT_COLUMNS: &str = "id, user_id, master_id, service_id, service_option_id, \
     start_time, end_time, status, notes, created_at, updated_at, deleted_at";

pub async fn create_appointment(conn: &mut PgConnection, appointment: &NewAppointment) -> Result<DbAppointment> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let row = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        INSERT INTO appointments
            (id, user_id, master_id, service_id, service_option_id, start_time, end_time, status, notes, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
        RETURNING {}
        "#,
        APPOINTMENT_COLUMNS
    ))
    .bind(id)
    .bind(appointment.user_id)
    .bind(appointment.master_id)
    .bind(appointment.service_id)
    .bind(appointment.service_option_id)
    .bind(appointment.range.start)
    .bind(appointment.range.end)
    .bind(appointment.status.as_str())
    .bind(&appointment.notes)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row)
}

pub async fn get_appointment_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<DbAppointment>> {
    let row = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {}
        FROM appointments
        WHERE id = $1 AND deleted_at IS NULL
        "#,
        APPOINTMENT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

pub async fn find_appointments(conn: &mut PgConnection, query: &AppointmentQuery) -> Result<Vec<DbAppointment>> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "SELECT {} FROM appointments WHERE deleted_at IS NULL",
        APPOINTMENT_COLUMNS
    ));

    if let Some(master_id) = query.master_id {
        builder.push(" AND master_id = ").push_bind(master_id);
    }
    if let Some(user_id) = query.user_id {
        builder.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(service_id) = query.service_id {
        builder.push(" AND service_id = ").push_bind(service_id);
    }
    if let Some(range) = query.overlapping {
        builder
            .push(" AND start_time < ")
            .push_bind(range.end)
            .push(" AND end_time > ")
            .push_bind(range.start);
    }
    if !query.statuses.is_empty() {
        let statuses: Vec<String> = query
            .statuses
            .iter()
            .map(|status| status.as_str().to_string())
            .collect();
        builder.push(" AND status = ANY(").push_bind(statuses).push(")");
    }
    if let Some(exclude_id) = query.exclude_id {
        builder.push(" AND id <> ").push_bind(exclude_id);
    }
    builder.push(" ORDER BY start_time ASC, created_at ASC");

    let rows = builder
        .build_query_as::<DbAppointment>()
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows)
}

pub async fn update_appointment_status(
    conn: &mut PgConnection,
    id: Uuid,
    status: AppointmentStatus,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE appointments
        SET status = $2, updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}
