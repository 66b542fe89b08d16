//! Measurement processing service
//!
//! Turns one weight reading plus a user profile into a health record:
//! - Meaningful-weight filter and input validation
//! - Age from date of birth, gender from the predictor or the profile
//! - Body composition with an optional predicted fat percentage
//! - History append, then best-effort telemetry and advice

use crate::error::ApiError;
use crate::state::AppState;
use chrono::Utc;
use smart_scale_shared::validation::{validate_date_of_birth, validate_height_cm, validate_weight};
use smart_scale_shared::{
    calculate_body_composition, calculate_body_composition_with_fat, is_meaningful_weight,
    HealthRecord, MeasurementInput, MeasurementRow, ReadingSource, UserProfile,
};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of processing one reading
#[derive(Debug, Clone)]
pub struct MeasurementOutcome {
    pub reading_id: Uuid,
    pub record: HealthRecord,
    /// Whether the record reached the telemetry broker
    pub published: bool,
    pub advice: Option<String>,
}

/// Measurement service
pub struct MeasurementService;

impl MeasurementService {
    /// Process one weight reading for `profile`
    ///
    /// Readings whose BMI does not exceed the meaningful threshold are
    /// rejected before anything is computed or stored.
    pub async fn process_reading(
        state: &AppState,
        profile: UserProfile,
        weight_kg: f64,
        source: ReadingSource,
    ) -> Result<MeasurementOutcome, ApiError> {
        let started = Instant::now();

        validate_height_cm(profile.height_cm).map_err(ApiError::Validation)?;
        if !is_meaningful_weight(weight_kg, profile.height_cm) {
            metrics::counter!("scale_readings_ignored_total").increment(1);
            return Err(ApiError::Validation(format!(
                "Reading of {:.2} kg is too light to be a person of {:.0} cm",
                weight_kg, profile.height_cm
            )));
        }
        validate_weight(weight_kg).map_err(ApiError::Validation)?;

        let age_years =
            validate_date_of_birth(profile.date_of_birth).map_err(ApiError::Validation)?;

        let gender = state
            .predictor()
            .predict_gender(profile.height_cm, weight_kg)
            .or(profile.gender)
            .ok_or_else(|| {
                ApiError::Validation("Gender is required when it cannot be predicted".to_string())
            })?;

        let input = MeasurementInput {
            height_cm: profile.height_cm,
            weight_kg,
            age_years,
            gender,
            activity_factor: profile.activity_level.multiplier(),
        };
        let options = state.config().engine.options();

        let predicted_fat = state
            .predictor()
            .predict_fat_percentage(age_years, gender, profile.height_cm, weight_kg)
            .filter(|fat| {
                if !fat.is_finite() {
                    warn!(predicted = %fat, "Ignoring non-finite fat prediction");
                }
                fat.is_finite()
            });

        let composition = match predicted_fat {
            Some(fat) => calculate_body_composition_with_fat(&input, &options, fat),
            None => calculate_body_composition(&input, &options),
        };

        let record = HealthRecord {
            profile,
            weight_kg,
            age_years,
            recorded_on: Utc::now().date_naive(),
            source,
            metrics: composition,
        };

        state
            .measurements()
            .append(MeasurementRow::from(&record))
            .await
            .map_err(|e| ApiError::Storage(format!("{:#}", e)))?;

        let published = match state.telemetry() {
            Some(telemetry) => match telemetry.publish(&record).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, name = %record.profile.name, "Telemetry publish failed");
                    metrics::counter!("scale_telemetry_failures_total").increment(1);
                    false
                }
            },
            None => false,
        };

        let advice = match state.advisor() {
            Some(advisor) => match advisor.advise(&record).await {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!(error = %e, name = %record.profile.name, "Advice unavailable");
                    metrics::counter!("scale_advice_failures_total").increment(1);
                    None
                }
            },
            None => None,
        };

        let reading_id = Uuid::new_v4();
        metrics::counter!("scale_readings_processed_total", "source" => source_label(source))
            .increment(1);
        metrics::histogram!("scale_reading_processing_seconds")
            .record(started.elapsed().as_secs_f64());

        info!(
            reading_id = %reading_id,
            name = %record.profile.name,
            weight_kg = record.weight_kg,
            bmi = record.metrics.bmi,
            fat_percentage = record.metrics.fat_percentage,
            published,
            "Reading processed"
        );

        Ok(MeasurementOutcome {
            reading_id,
            record,
            published,
            advice,
        })
    }
}

fn source_label(source: ReadingSource) -> &'static str {
    match source {
        ReadingSource::Manual => "manual",
        ReadingSource::Scale => "scale",
        ReadingSource::Simulated => "simulated",
    }
}
