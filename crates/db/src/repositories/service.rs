use crate::models::{DbService, DbServiceOption};
use eyre::Result;
use sqlx::PgConnection;
use uuid::Uuid;

pub async fn get_service_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<DbService>> {
    let service = sqlx::query_as::<_, DbService>(
        r#"
        SELECT id, master_id, name, duration_minutes, price, created_at, deleted_at
        FROM services
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(service)
}

pub async fn get_options_by_service_id(
    conn: &mut PgConnection,
    service_id: Uuid,
) -> Result<Vec<DbServiceOption>> {
    let options = sqlx::query_as::<_, DbServiceOption>(
        r#"
        SELECT id, service_id, name, duration_minutes, price
        FROM service_options
        WHERE service_id = $1
        ORDER BY name ASC
        "#,
    )
    .bind(service_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(options)
}

/// Catalog rows are owned elsewhere; this exists for seeding and tests.
pub async fn create_service(
    conn: &mut PgConnection,
    master_id: Uuid,
    name: &str,
    duration_minutes: i32,
    price: f64,
) -> Result<DbService> {
    let service = sqlx::query_as::<_, DbService>(
        r#"
        INSERT INTO services (id, master_id, name, duration_minutes, price)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, master_id, name, duration_minutes, price, created_at, deleted_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(master_id)
    .bind(name)
    .bind(duration_minutes)
    .bind(price)
    .fetch_one(&mut *conn)
    .await?;

    Ok(service)
}

pub async fn create_service_option(
    conn: &mut PgConnection,
    service_id: Uuid,
    name: &str,
    duration_minutes: i32,
    price: f64,
) -> Result<DbServiceOption> {
    let option = sqlx::query_as::<_, DbServiceOption>(
        r#"
        INSERT INTO service_options (id, service_id, name, duration_minutes, price)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, service_id, name, duration_minutes, price
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(service_id)
    .bind(name)
    .bind(duration_minutes)
    .bind(price)
    .fetch_one(&mut *conn)
    .await?;

    Ok(option)
}
