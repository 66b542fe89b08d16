//! API request and response types

use crate::body_composition::{
    ActivityLevel, CalculationOptions, FormulaVariant, Gender, MeasurementInput,
};
use crate::errors::AppError;
use crate::models::{HealthRecord, MeasurementRow, ReadingSource, UserProfile};
use crate::scale::ScaleModel;
use crate::validation::{parse_date_of_birth, validate_activity_factor};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

// ============================================================================
// Body Composition
// ============================================================================

/// Stateless calculation request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CalculateMetricsRequest {
    #[validate(range(min = 50.0, max = 300.0))]
    pub height_cm: f64,
    #[validate(range(min = 20.0, max = 500.0))]
    pub weight_kg: f64,
    #[validate(range(min = 1, max = 150))]
    pub age: u32,
    /// Free-form label; only `"male"` is male
    pub gender: String,
    pub activity_factor: f64,
    #[serde(default)]
    pub protein_variant: FormulaVariant,
    #[serde(default)]
    pub ideal_weight_variant: FormulaVariant,
    /// Externally predicted fat percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub fat_percentage: Option<f64>,
}

impl CalculateMetricsRequest {
    /// Resolve the request into engine input, checking the activity factor
    pub fn to_input(&self) -> Result<MeasurementInput, AppError> {
        validate_activity_factor(self.activity_factor).map_err(AppError::Validation)?;
        Ok(MeasurementInput {
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            age_years: self.age,
            gender: Gender::from_label(&self.gender),
            activity_factor: self.activity_factor,
        })
    }

    pub fn options(&self) -> CalculationOptions {
        CalculationOptions {
            protein: self.protein_variant,
            ideal_weight: self.ideal_weight_variant,
        }
    }
}

// ============================================================================
// Measurements
// ============================================================================

/// Profile fields sent with a reading
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// `dd/mm/yyyy` or `yyyy-mm-dd`
    pub date_of_birth: String,
    #[validate(range(min = 50.0, max = 300.0))]
    pub height_cm: f64,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl ProfileRequest {
    pub fn to_profile(&self) -> Result<UserProfile, AppError> {
        Ok(UserProfile {
            name: self.name.trim().to_string(),
            date_of_birth: parse_date_of_birth(&self.date_of_birth).map_err(AppError::Parse)?,
            height_cm: self.height_cm,
            activity_level: self.activity_level,
            gender: self.gender.as_deref().map(Gender::from_label),
        })
    }
}

/// Record a weight reading for a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordReadingRequest {
    pub profile: ProfileRequest,
    #[validate(range(min = 20.0, max = 500.0))]
    pub weight_kg: f64,
    #[serde(default)]
    pub source: ReadingSource,
}

/// Record a raw scale notification for a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScalePacketRequest {
    pub profile: ProfileRequest,
    #[validate(length(min = 2, max = 128))]
    pub packet_hex: String,
    /// Advertised name of the sending scale; the configured model when absent
    #[serde(default)]
    pub device_name: Option<String>,
}

/// Result of processing one reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementResponse {
    pub reading_id: String,
    pub record: HealthRecord,
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
}

/// History query parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub name: String,
}

/// Measurement history for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub name: String,
    pub items: Vec<MeasurementRow>,
    pub total_count: usize,
    /// Date of the newest row
    pub latest_date: Option<NaiveDate>,
}

impl HistoryResponse {
    pub fn new(name: impl Into<String>, items: Vec<MeasurementRow>) -> Self {
        let latest_date = items.iter().filter_map(MeasurementRow::recorded_on).max();
        Self {
            name: name.into(),
            total_count: items.len(),
            items,
            latest_date,
        }
    }
}

/// Configured scale and the characteristic it notifies on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleInfo {
    pub model: ScaleModel,
    pub device_name: String,
    pub measurement_characteristic: String,
}

impl From<ScaleModel> for ScaleInfo {
    fn from(model: ScaleModel) -> Self {
        Self {
            model,
            device_name: model.device_name().to_string(),
            measurement_characteristic: model.measurement_characteristic().to_string(),
        }
    }
}

/// Users present in the history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    pub names: Vec<String>,
}

/// Activity level description for pickers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLevelInfo {
    pub level: ActivityLevel,
    pub multiplier: f64,
    pub description: String,
}

impl From<ActivityLevel> for ActivityLevelInfo {
    fn from(level: ActivityLevel) -> Self {
        Self {
            level,
            multiplier: level.multiplier(),
            description: level.description().to_string(),
        }
    }
}
