use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

/// Partial unique index backing the one-active-appointment-per-interval rule.
pub const ACTIVE_APPOINTMENT_INDEX: &str = "uq_appointments_active_interval";

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create services table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS services (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            master_id UUID NOT NULL,
            name VARCHAR(255) NOT NULL,
            duration_minutes INTEGER NOT NULL,
            price DOUBLE PRECISION NOT NULL DEFAULT 0,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            deleted_at TIMESTAMP WITH TIME ZONE NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create service_options table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS service_options (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            service_id UUID NOT NULL REFERENCES services(id),
            name VARCHAR(255) NOT NULL,
            duration_minutes INTEGER NOT NULL,
            price DOUBLE PRECISION NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create time_slots table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS time_slots (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            master_id UUID NOT NULL,
            service_id UUID NOT NULL REFERENCES services(id),
            start_time TIMESTAMP WITH TIME ZONE NOT NULL,
            end_time TIMESTAMP WITH TIME ZONE NOT NULL,
            is_booked BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            deleted_at TIMESTAMP WITH TIME ZONE NULL,
            CONSTRAINT valid_time_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create appointments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL,
            master_id UUID NOT NULL,
            service_id UUID NOT NULL REFERENCES services(id),
            service_option_id UUID NULL REFERENCES service_options(id),
            start_time TIMESTAMP WITH TIME ZONE NOT NULL,
            end_time TIMESTAMP WITH TIME ZONE NOT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'pending',
            notes TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            deleted_at TIMESTAMP WITH TIME ZONE NULL,
            CONSTRAINT valid_appointment_range CHECK (end_time > start_time),
            CONSTRAINT valid_status CHECK (status IN ('pending', 'confirmed', 'rejected', 'cancelled'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_time_slots_master_range
        ON time_slots (master_id, start_time, end_time)
        WHERE deleted_at IS NULL;
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_appointments_master_range
        ON appointments (master_id, start_time, end_time)
        WHERE deleted_at IS NULL;
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_appointments_user
        ON appointments (user_id)
        WHERE deleted_at IS NULL;
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS {}
        ON appointments (master_id, start_time, end_time)
        WHERE deleted_at IS NULL AND status IN ('pending', 'confirmed');
        "#,
        ACTIVE_APPOINTMENT_INDEX
    ))
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully");
    Ok(())
}
