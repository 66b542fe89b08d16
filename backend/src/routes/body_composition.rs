//! Stateless body composition API routes

use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Json, Router,
};
use smart_scale_shared::{
    calculate_body_composition, calculate_body_composition_with_fat, ActivityLevel,
    ActivityLevelInfo, CalculateMetricsRequest, MetricsRecord,
};
use validator::Validate;

/// Create body composition routes
pub fn body_composition_routes() -> Router<AppState> {
    Router::new()
        .route("/body-composition", post(calculate))
        .route("/activity-levels", get(activity_levels))
}

/// POST /api/v1/body-composition - Run every formula for one measurement
///
/// Nothing is stored. A supplied `fat_percentage` replaces the intrinsic
/// estimate for the whole downstream chain.
async fn calculate(Json(req): Json<CalculateMetricsRequest>) -> ApiResult<Json<MetricsRecord>> {
    req.validate()?;
    let input = req.to_input()?;
    let options = req.options();

    let record = match req.fat_percentage {
        Some(fat) => calculate_body_composition_with_fat(&input, &options, fat),
        None => calculate_body_composition(&input, &options),
    };

    Ok(Json(record))
}

/// GET /api/v1/activity-levels - Supported activity factors
async fn activity_levels() -> Json<Vec<ActivityLevelInfo>> {
    Json(ActivityLevel::ALL.into_iter().map(ActivityLevelInfo::from).collect())
}
