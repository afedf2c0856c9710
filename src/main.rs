use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use timebook_api::config::ApiConfig;
use timebook_db::{PgCalendarStore, create_pool, schema::initialize_database};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration and start logging
    let config = ApiConfig::from_env()?;
    timebook_api::init_tracing(config.log_level)?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url, config.database_max_connections).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;
    info!(
        workday_start = config.grid.workday_start_hour,
        workday_end = config.grid.workday_end_hour,
        step_minutes = config.grid.step_minutes,
        "Calendar store ready"
    );

    // Start API server
    let store = Arc::new(PgCalendarStore::new(db_pool));
    timebook_api::start_server(config, store).await?;

    Ok(())
}
