//! # Timebook API
//!
//! The API crate provides the web server for the Timebook booking service.
//! It exposes availability lookup, appointment booking with master and admin
//! status transitions, and master time-slot management.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate requests into booking engine calls
//! - **Middleware**: Caller identity extraction and error mapping
//! - **Config**: Environment-driven settings
//!
//! The API uses Axum as the web framework. Persistence sits behind the
//! `CalendarStore` trait from `timebook-core`, so the server itself does not
//! depend on a particular database.

/// Configuration module for API settings
pub mod config;
/// Request handlers that translate HTTP into engine calls
pub mod handlers;
/// Caller identity and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
};
use eyre::Result;
use timebook_core::{BookingEngine, store::CalendarStore};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::middleware::auth::{USER_ID_HEADER, USER_ROLE_HEADER};

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    /// Booking engine over the configured calendar store
    pub engine: BookingEngine,
}

/// Builds the application router with every route and request tracing.
///
/// CORS and request timeouts are applied by [`start_server`] since they
/// depend on configuration.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Availability lookup
        .merge(routes::availability::routes())
        // Appointment booking and status transitions
        .merge(routes::appointment::routes())
        // Master time-slot management
        .merge(routes::time_slot::routes())
        // Attach shared state to all routes
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Installs the global tracing subscriber at the given level.
pub fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USER_ROLE_HEADER),
        ])
        .allow_origin(allowed)
        .allow_credentials(true)
}

/// Starts the API server with the provided configuration and calendar store
///
/// # Arguments
///
/// * `config` - API configuration including host, port, and grid settings
/// * `store` - Calendar store the booking engine runs its transactions on
///
/// # Returns
///
/// * `Result<()>` - Success or error result
pub async fn start_server(config: config::ApiConfig, store: Arc<dyn CalendarStore>) -> Result<()> {
    let state = Arc::new(ApiState {
        engine: BookingEngine::new(store, config.grid),
    });

    let app = build_router(state);

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)),
        None => app,
    };

    // Add request timeout middleware
    let app = app.layer(
        ServiceBuilder::new()
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout)))
            .into_inner(),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
