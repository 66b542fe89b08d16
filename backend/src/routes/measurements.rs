//! Measurement API routes
//!
//! Readings arrive either as a decoded weight or as the raw scale
//! notification; both go through the same processing pipeline.

use crate::error::{ApiError, ApiResult};
use crate::services::{MeasurementOutcome, MeasurementService};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use smart_scale_shared::{
    HistoryQuery, HistoryResponse, MeasurementResponse, ReadingSource, RecordReadingRequest,
    ScaleInfo, ScaleModel, ScalePacketRequest, UsersResponse,
};
use tracing::debug;
use validator::Validate;

/// Create measurement routes
pub fn measurement_routes() -> Router<AppState> {
    Router::new()
        .route("/measurements", post(record_reading).get(get_history))
        .route("/measurements/packet", post(record_packet))
        .route("/users", get(list_users))
        .route("/scale", get(scale_info))
}

impl From<MeasurementOutcome> for MeasurementResponse {
    fn from(outcome: MeasurementOutcome) -> Self {
        Self {
            reading_id: outcome.reading_id.to_string(),
            record: outcome.record,
            published: outcome.published,
            advice: outcome.advice,
        }
    }
}

/// POST /api/v1/measurements - Process a decoded weight reading
async fn record_reading(
    State(state): State<AppState>,
    Json(req): Json<RecordReadingRequest>,
) -> ApiResult<(StatusCode, Json<MeasurementResponse>)> {
    req.validate()?;
    req.profile.validate()?;
    let profile = req.profile.to_profile()?;

    let outcome =
        MeasurementService::process_reading(&state, profile, req.weight_kg, req.source).await?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// POST /api/v1/measurements/packet - Decode a raw scale notification and process it
///
/// `device_name` picks the byte layout; the configured model is used without it.
async fn record_packet(
    State(state): State<AppState>,
    Json(req): Json<ScalePacketRequest>,
) -> ApiResult<(StatusCode, Json<MeasurementResponse>)> {
    req.validate()?;
    req.profile.validate()?;
    let profile = req.profile.to_profile()?;

    let model = match req.device_name.as_deref() {
        Some(name) => ScaleModel::from_device_name(name)?,
        None => state.config().scale.model,
    };
    let weight_kg = model.decode_hex_weight(&req.packet_hex)?;
    debug!(device = model.device_name(), weight_kg, "Decoded scale packet");

    let outcome =
        MeasurementService::process_reading(&state, profile, weight_kg, ReadingSource::Scale)
            .await?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// GET /api/v1/measurements?name= - History for one user, oldest first
async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<HistoryResponse>> {
    let name = query.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }

    let items = state
        .measurements()
        .history(name)
        .await
        .map_err(|e| ApiError::Storage(format!("{:#}", e)))?;

    if items.is_empty() {
        return Err(ApiError::NotFound(format!("No measurements for '{}'", name)));
    }

    Ok(Json(HistoryResponse::new(name, items)))
}

/// GET /api/v1/users - Names present in the history
async fn list_users(State(state): State<AppState>) -> ApiResult<Json<UsersResponse>> {
    let names = state
        .measurements()
        .names()
        .await
        .map_err(|e| ApiError::Storage(format!("{:#}", e)))?;

    Ok(Json(UsersResponse { names }))
}

/// GET /api/v1/scale - Configured scale model
async fn scale_info(State(state): State<AppState>) -> Json<ScaleInfo> {
    Json(ScaleInfo::from(state.config().scale.model))
}
