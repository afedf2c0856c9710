//! # Appointment Handlers
//!
//! Booking and status transitions. Client bookings start pending; a master
//! booking into their own calendar starts confirmed. Admin routes act on any
//! calendar.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use timebook_core::{
    models::{
        appointment::{
            Appointment, AppointmentDetails, AppointmentListFilter, AppointmentStatus,
            BookingRequest, CreateAppointmentRequest, CreateClientAppointmentRequest,
        },
        caller::CallerScope,
    },
    parse::parse_instant,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{auth::CurrentCaller, error_handling::AppError},
};

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentListParams {
    pub master_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
}

impl From<AppointmentListParams> for AppointmentListFilter {
    fn from(params: AppointmentListParams) -> Self {
        AppointmentListFilter {
            master_id: params.master_id,
            status: params.status,
        }
    }
}

/// Books a pending appointment for the calling client
///
/// # Endpoint
///
/// ```text
/// POST /api/appointments
/// ```
#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<ApiState>>,
    caller: CurrentCaller,
    Json(payload): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentDetails>), AppError> {
    let user_id = caller.require_client()?;
    let start = parse_instant(&payload.start_time)?;

    let details = state
        .engine
        .create_appointment(
            caller.scope(),
            BookingRequest {
                user_id,
                master_id: payload.master_id,
                service_id: payload.service_id,
                service_option_id: payload.service_option_id,
                start,
                notes: payload.notes.unwrap_or_default(),
            },
        )
        .await?;

    info!(appointment_id = %details.appointment.id, %user_id, "Client booked appointment");
    Ok((StatusCode::CREATED, Json(details)))
}

/// Lists the calling client's own appointments
pub async fn list_my_appointments(
    State(state): State<Arc<ApiState>>,
    caller: CurrentCaller,
    Query(params): Query<AppointmentListParams>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    caller.require_client()?;
    let appointments = state
        .engine
        .list_appointments(caller.scope(), params.into())
        .await?;
    Ok(Json(appointments))
}

/// Books a client into the calling master's calendar; the appointment starts confirmed
///
/// # Endpoint
///
/// ```text
/// POST /api/master/appointments
/// ```
#[axum::debug_handler]
pub async fn create_master_appointment(
    State(state): State<Arc<ApiState>>,
    caller: CurrentCaller,
    Json(payload): Json<CreateClientAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentDetails>), AppError> {
    let master_id = caller.require_master()?;
    let start = parse_instant(&payload.start_time)?;

    let details = state
        .engine
        .create_appointment(
            caller.scope(),
            BookingRequest {
                user_id: payload.user_id,
                master_id,
                service_id: payload.service_id,
                service_option_id: payload.service_option_id,
                start,
                notes: payload.notes.unwrap_or_default(),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(details)))
}

pub async fn list_master_appointments(
    State(state): State<Arc<ApiState>>,
    caller: CurrentCaller,
    Query(params): Query<AppointmentListParams>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    caller.require_master()?;
    let appointments = state
        .engine
        .list_appointments(caller.scope(), params.into())
        .await?;
    Ok(Json(appointments))
}

pub async fn master_confirm_appointment(
    State(state): State<Arc<ApiState>>,
    caller: CurrentCaller,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<AppointmentDetails>, AppError> {
    caller.require_master()?;
    let details = state
        .engine
        .confirm_appointment(caller.scope(), appointment_id)
        .await?;
    Ok(Json(details))
}

pub async fn master_reject_appointment(
    State(state): State<Arc<ApiState>>,
    caller: CurrentCaller,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<AppointmentDetails>, AppError> {
    caller.require_master()?;
    let details = state
        .engine
        .reject_appointment(caller.scope(), appointment_id)
        .await?;
    Ok(Json(details))
}

/// Lists appointments across calendars, optionally narrowed by master and status
pub async fn admin_list_appointments(
    State(state): State<Arc<ApiState>>,
    caller: CurrentCaller,
    Query(params): Query<AppointmentListParams>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    caller.require_admin()?;
    let appointments = state
        .engine
        .list_appointments(CallerScope::Admin, params.into())
        .await?;
    Ok(Json(appointments))
}

pub async fn admin_confirm_appointment(
    State(state): State<Arc<ApiState>>,
    caller: CurrentCaller,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<AppointmentDetails>, AppError> {
    caller.require_admin()?;
    let details = state
        .engine
        .confirm_appointment(CallerScope::Admin, appointment_id)
        .await?;
    Ok(Json(details))
}

pub async fn admin_reject_appointment(
    State(state): State<Arc<ApiState>>,
    caller: CurrentCaller,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<AppointmentDetails>, AppError> {
    caller.require_admin()?;
    let details = state
        .engine
        .reject_appointment(CallerScope::Admin, appointment_id)
        .await?;
    Ok(Json(details))
}
