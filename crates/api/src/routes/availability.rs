use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new().route(
        "/api/masters/:master_id/services/:service_id/slots",
        get(handlers::availability::get_availability),
    )
}
