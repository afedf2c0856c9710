//! # Availability Handlers
//!
//! Public read of bookable windows for one service of one master. Windows
//! come from the master's declared slots when any exist in the range, and
//! from the working-hours grid otherwise.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use timebook_core::{
    models::{
        availability::{AvailabilityQuery, AvailabilityWindow},
        time_range::TimeRange,
    },
    parse::{RangeBound, parse_range_bound},
};
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

/// Query parameters for the availability endpoint
///
/// Both bounds accept a timestamp or a bare `YYYY-MM-DD` date. Without
/// `start_date` the range starts now; without `end_date` it spans the
/// configured number of days from the start.
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Service option whose duration shapes the windows
    pub option_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub master_id: Uuid,
    pub service_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub windows: Vec<AvailabilityWindow>,
}

/// Lists availability windows
///
/// # Endpoint
///
/// ```text
/// GET /api/masters/{master_id}/services/{service_id}/slots?start_date=2024-01-01&end_date=2024-01-07
/// ```
#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<ApiState>>,
    Path((master_id, service_id)): Path<(Uuid, Uuid)>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let default_range = state.engine.default_range();

    let start = match params.start_date.as_deref() {
        Some(raw) => parse_range_bound(raw, RangeBound::Start)?,
        None => default_range.start,
    };
    let end = match params.end_date.as_deref() {
        Some(raw) => parse_range_bound(raw, RangeBound::End)?,
        None => start + Duration::days(state.engine.settings().default_days),
    };

    let windows = state
        .engine
        .get_availability(AvailabilityQuery {
            master_id,
            service_id,
            service_option_id: params.option_id,
            range: TimeRange::new(start, end),
        })
        .await?;

    Ok(Json(AvailabilityResponse {
        master_id,
        service_id,
        start_date: start,
        end_date: end,
        windows,
    }))
}
