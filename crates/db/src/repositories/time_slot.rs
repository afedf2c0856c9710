use crate::models::DbTimeSlot;
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use timebook_core::store::{SlotQuery, SlotWindow};
use uuid::Uuid;

const SLOT_COLUMNS: &str =
    "id, master_id, service_id, start_time, end_time, is_booked, created_at, updated_at, deleted_at";

pub async fn create_time_slot(
    conn: &mut PgConnection,
    master_id: Uuid,
    service_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    is_booked: bool,
) -> Result<DbTimeSlot> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let time_slot = sqlx::query_as::<_, DbTimeSlot>(&format!(
        r#"
        INSERT INTO time_slots (id, master_id, service_id, start_time, end_time, is_booked, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        RETURNING {}
        "#,
        SLOT_COLUMNS
    ))
    .bind(id)
    .bind(master_id)
    .bind(service_id)
    .bind(start_time)
    .bind(end_time)
    .bind(is_booked)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    Ok(time_slot)
}

pub async fn get_time_slot_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<DbTimeSlot>> {
    let time_slot = sqlx::query_as::<_, DbTimeSlot>(&format!(
        r#"
        SELECT {}
        FROM time_slots
        WHERE id = $1 AND deleted_at IS NULL
        "#,
        SLOT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(time_slot)
}

pub async fn find_time_slots(conn: &mut PgConnection, query: &SlotQuery) -> Result<Vec<DbTimeSlot>> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "SELECT {} FROM time_slots WHERE deleted_at IS NULL AND master_id = ",
        SLOT_COLUMNS
    ));
    builder.push_bind(query.master_id);

    match query.window {
        SlotWindow::Any => {}
        SlotWindow::Overlapping(range) => {
            builder
                .push(" AND start_time < ")
                .push_bind(range.end)
                .push(" AND end_time > ")
                .push_bind(range.start);
        }
        SlotWindow::Exact(range) => {
            builder
                .push(" AND start_time = ")
                .push_bind(range.start)
                .push(" AND end_time = ")
                .push_bind(range.end);
        }
        SlotWindow::Within { from, to } => {
            if let Some(from) = from {
                builder.push(" AND start_time >= ").push_bind(from);
            }
            if let Some(to) = to {
                builder.push(" AND end_time <= ").push_bind(to);
            }
        }
    }

    if let Some(service_id) = query.service_id {
        builder.push(" AND service_id = ").push_bind(service_id);
    }
    if let Some(booked) = query.booked {
        builder.push(" AND is_booked = ").push_bind(booked);
    }
    if let Some(exclude_id) = query.exclude_id {
        builder.push(" AND id <> ").push_bind(exclude_id);
    }
    builder.push(" ORDER BY start_time ASC, end_time ASC, created_at ASC");

    let time_slots = builder
        .build_query_as::<DbTimeSlot>()
        .fetch_all(&mut *conn)
        .await?;

    Ok(time_slots)
}

pub async fn update_time_slot_range(
    conn: &mut PgConnection,
    id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<Option<DbTimeSlot>> {
    let time_slot = sqlx::query_as::<_, DbTimeSlot>(&format!(
        r#"
        UPDATE time_slots
        SET start_time = $2, end_time = $3, updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL AND is_booked = FALSE
        RETURNING {}
        "#,
        SLOT_COLUMNS
    ))
    .bind(id)
    .bind(start_time)
    .bind(end_time)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(time_slot)
}

pub async fn set_time_slot_booked(conn: &mut PgConnection, id: Uuid, is_booked: bool) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE time_slots
        SET is_booked = $2, updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .bind(is_booked)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

pub async fn book_time_slots_at(
    conn: &mut PgConnection,
    master_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE time_slots
        SET is_booked = TRUE, updated_at = NOW()
        WHERE master_id = $1 AND start_time = $2 AND end_time = $3 AND deleted_at IS NULL
        "#,
    )
    .bind(master_id)
    .bind(start_time)
    .bind(end_time)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

pub async fn soft_delete_time_slot(conn: &mut PgConnection, id: Uuid) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE time_slots
        SET deleted_at = NOW(), updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL AND is_booked = FALSE
        "#,
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}
