use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers::time_slot, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/master/time-slots",
            get(time_slot::list_time_slots).post(time_slot::create_time_slot),
        )
        .route(
            "/api/master/time-slots/toggle",
            post(time_slot::toggle_time_slot),
        )
        .route(
            "/api/master/time-slots/:id",
            put(time_slot::update_time_slot).delete(time_slot::delete_time_slot),
        )
        .route(
            "/api/master/time-slots/:id/toggle",
            post(time_slot::toggle_time_slot_by_id),
        )
}
