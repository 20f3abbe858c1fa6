//! HTTP handlers for dashboard session endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{Advisory, CropType, DerivedMetrics, FarmParameters, FarmParametersInput, LocationInput};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::ReportedGeolocation;
use crate::services::DashboardSnapshot;
use crate::AppState;

/// Crop type option for the selector
#[derive(Debug, Serialize)]
pub struct CropOption {
    pub code: &'static str,
    pub name: String,
}

/// List the selectable crop types
pub async fn list_crops() -> Json<Vec<CropOption>> {
    Json(
        CropType::ALL
            .into_iter()
            .map(|crop| CropOption {
                code: crop.code(),
                name: crop.to_string(),
            })
            .collect(),
    )
}

/// Body for starting a session
#[derive(Debug, Default, Deserialize)]
pub struct StartSessionRequest {
    /// Outcome of the browser's geolocation request
    pub geolocation: Option<ReportedGeolocation>,
    pub crop_type: Option<CropType>,
}

/// Start a dashboard session
pub async fn start_session(
    State(state): State<AppState>,
    Json(input): Json<StartSessionRequest>,
) -> AppResult<(StatusCode, Json<DashboardSnapshot>)> {
    let orchestrator = state.sessions.start(input.geolocation, input.crop_type).await;
    Ok((StatusCode::CREATED, Json(orchestrator.snapshot())))
}

/// Get the current dashboard snapshot
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<DashboardSnapshot>> {
    let orchestrator = state.sessions.get(session_id).await?;
    Ok(Json(orchestrator.snapshot()))
}

/// End a dashboard session
pub async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.sessions.end(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Manual location override
pub async fn set_location(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(input): Json<LocationInput>,
) -> AppResult<Json<DashboardSnapshot>> {
    let orchestrator = state.sessions.get(session_id).await?;
    orchestrator.change_location(input)?;
    Ok(Json(orchestrator.snapshot()))
}

#[derive(Debug, Deserialize)]
pub struct CropRequest {
    pub crop_type: CropType,
}

/// Change the selected crop type
pub async fn set_crop(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(input): Json<CropRequest>,
) -> AppResult<Json<DashboardSnapshot>> {
    let orchestrator = state.sessions.get(session_id).await?;
    orchestrator.change_crop(input.crop_type);
    Ok(Json(orchestrator.snapshot()))
}

/// Re-fetch environment data for the current location
pub async fn refresh(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<DashboardSnapshot>> {
    let orchestrator = state.sessions.get(session_id).await?;
    orchestrator.refresh();
    Ok(Json(orchestrator.snapshot()))
}

/// Update area and efficiency parameters
pub async fn update_parameters(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(input): Json<FarmParametersInput>,
) -> AppResult<Json<FarmParameters>> {
    let orchestrator = state.sessions.get(session_id).await?;
    let parameters = orchestrator.update_parameters(input)?;
    Ok(Json(parameters))
}

/// Preview derived metrics for ad-hoc parameters
pub async fn preview_metrics(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<FarmParametersInput>,
) -> AppResult<Json<DerivedMetrics>> {
    let orchestrator = state.sessions.get(session_id).await?;
    orchestrator
        .preview_metrics(query)?
        .map(Json)
        .ok_or(AppError::RecommendationUnavailable)
}

/// Acknowledge and drain pending advisories
pub async fn acknowledge_advisories(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<Vec<Advisory>>> {
    let orchestrator = state.sessions.get(session_id).await?;
    Ok(Json(orchestrator.acknowledge_advisories()))
}
