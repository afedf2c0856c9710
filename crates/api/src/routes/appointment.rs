use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers::appointment, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        // Client routes
        .route(
            "/api/appointments",
            get(appointment::list_my_appointments).post(appointment::create_appointment),
        )
        // Master routes
        .route(
            "/api/master/appointments",
            get(appointment::list_master_appointments).post(appointment::create_master_appointment),
        )
        .route(
            "/api/master/appointments/:id/confirm",
            put(appointment::master_confirm_appointment),
        )
        .route(
            "/api/master/appointments/:id/reject",
            put(appointment::master_reject_appointment),
        )
        // Admin routes
        .route(
            "/api/admin/appointments",
            get(appointment::admin_list_appointments),
        )
        .route(
            "/api/admin/appointments/:id/confirm",
            put(appointment::admin_confirm_appointment),
        )
        .route(
            "/api/admin/appointments/:id/reject",
            put(appointment::admin_reject_appointment),
        )
}
