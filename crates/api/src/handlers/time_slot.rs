use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use timebook_core::{
    errors::BookingError,
    models::{
        time_range::TimeRange,
        time_slot::{
            CreateTimeSlotRequest, SlotListFilter, SlotRef, TimeSlot, ToggleTimeSlotRequest,
            UpdateTimeSlotRequest,
        },
    },
    parse::{RangeBound, parse_instant, parse_range_bound},
};
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{auth::CurrentCaller, error_handling::AppError},
};

#[derive(Debug, Default, Deserialize)]
pub struct SlotListParams {
    pub service_id: Option<Uuid>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub is_booked: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleBookedRequest {
    pub is_booked: bool,
}

#[axum::debug_handler]
pub async fn create_time_slot(
    State(state): State<Arc<ApiState>>,
    caller: CurrentCaller,
    Json(payload): Json<CreateTimeSlotRequest>,
) -> Result<(StatusCode, Json<TimeSlot>), AppError> {
    let master_id = caller.require_master()?;
    let range = TimeRange::new(
        parse_instant(&payload.start_time)?,
        parse_instant(&payload.end_time)?,
    );

    let slot = state
        .engine
        .create_slot(master_id, payload.service_id, range)
        .await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

pub async fn list_time_slots(
    State(state): State<Arc<ApiState>>,
    caller: CurrentCaller,
    Query(params): Query<SlotListParams>,
) -> Result<Json<Vec<TimeSlot>>, AppError> {
    let master_id = caller.require_master()?;
    let filter = SlotListFilter {
        service_id: params.service_id,
        from: params
            .from
            .as_deref()
            .map(|raw| parse_range_bound(raw, RangeBound::Start))
            .transpose()?,
        to: params
            .to
            .as_deref()
            .map(|raw| parse_range_bound(raw, RangeBound::End))
            .transpose()?,
        booked: params.is_booked,
    };

    let slots = state.engine.list_slots(master_id, filter).await?;
    Ok(Json(slots))
}

pub async fn update_time_slot(
    State(state): State<Arc<ApiState>>,
    caller: CurrentCaller,
    Path(slot_id): Path<Uuid>,
    Json(payload): Json<UpdateTimeSlotRequest>,
) -> Result<Json<TimeSlot>, AppError> {
    let master_id = caller.require_master()?;
    let start = payload.start_time.as_deref().map(parse_instant).transpose()?;
    let end = payload.end_time.as_deref().map(parse_instant).transpose()?;

    let slot = state
        .engine
        .update_slot(master_id, slot_id, start, end)
        .await?;
    Ok(Json(slot))
}

pub async fn delete_time_slot(
    State(state): State<Arc<ApiState>>,
    caller: CurrentCaller,
    Path(slot_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let master_id = caller.require_master()?;
    state.engine.delete_slot(master_id, slot_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Blocks or frees an interval, creating the slot when none matches it exactly
///
/// # Endpoint
///
/// ```text
/// POST /api/master/time-slots/toggle
/// {"service_id": "...", "start_time": "...", "end_time": "...", "is_booked": true}
/// ```
pub async fn toggle_time_slot(
    State(state): State<Arc<ApiState>>,
    caller: CurrentCaller,
    Json(payload): Json<ToggleTimeSlotRequest>,
) -> Result<Json<TimeSlot>, AppError> {
    let master_id = caller.require_master()?;
    let (Some(service_id), Some(start), Some(end)) = (
        payload.service_id,
        payload.start_time.as_deref(),
        payload.end_time.as_deref(),
    ) else {
        return Err(BookingError::Validation(
            "service_id, start_time and end_time are required".to_string(),
        )
        .into());
    };

    let slot_ref = SlotRef::Interval {
        service_id,
        range: TimeRange::new(parse_instant(start)?, parse_instant(end)?),
    };
    let slot = state
        .engine
        .toggle_slot_booking(master_id, slot_ref, payload.is_booked)
        .await?;
    Ok(Json(slot))
}

pub async fn toggle_time_slot_by_id(
    State(state): State<Arc<ApiState>>,
    caller: CurrentCaller,
    Path(slot_id): Path<Uuid>,
    Json(payload): Json<ToggleBookedRequest>,
) -> Result<Json<TimeSlot>, AppError> {
    let master_id = caller.require_master()?;
    let slot = state
        .engine
        .toggle_slot_booking(master_id, SlotRef::Id(slot_id), payload.is_booked)
        .await?;
    Ok(Json(slot))
}
