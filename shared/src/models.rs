//! Data models for the Smart Scale application

use crate::body_composition::{ActivityLevel, Gender, MetricsRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used in the measurement history file
pub const HISTORY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Where a weight reading came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadingSource {
    #[default]
    Manual,
    Scale,
    Simulated,
}

/// Person standing on the scale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub height_cm: f64,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    /// Declared gender, used when no predictor is available
    #[serde(default)]
    pub gender: Option<Gender>,
}

/// Latest measurement for a user, handed to the history and advice sinks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthRecord {
    pub profile: UserProfile,
    pub weight_kg: f64,
    pub age_years: u32,
    pub recorded_on: NaiveDate,
    pub source: ReadingSource,
    pub metrics: MetricsRecord,
}

/// One row of the measurement history file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeasurementRow {
    pub date: String,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub height: f64,
    pub weight: f64,
    pub activity_factor: f64,
    pub bmi: f64,
    pub bmr: f64,
    pub tdee: f64,
    pub lean_body_mass: f64,
    pub fat_percentage: f64,
    pub water_percentage: f64,
    pub bone_mass: f64,
    pub muscle_mass: f64,
    pub protein_percentage: f64,
    pub visceral_fat: f64,
    pub ideal_weight: f64,
}

impl MeasurementRow {
    /// Parsed row date, `None` if the file holds something unexpected
    pub fn recorded_on(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, HISTORY_DATE_FORMAT).ok()
    }
}

impl From<&HealthRecord> for MeasurementRow {
    fn from(record: &HealthRecord) -> Self {
        let m = &record.metrics;
        Self {
            date: record.recorded_on.format(HISTORY_DATE_FORMAT).to_string(),
            name: record.profile.name.clone(),
            age: record.age_years,
            gender: m.gender,
            height: record.profile.height_cm,
            weight: record.weight_kg,
            activity_factor: record.profile.activity_level.multiplier(),
            bmi: m.bmi,
            bmr: m.bmr,
            tdee: m.tdee,
            lean_body_mass: m.lean_body_mass,
            fat_percentage: m.fat_percentage,
            water_percentage: m.water_percentage,
            bone_mass: m.bone_mass,
            muscle_mass: m.muscle_mass,
            protein_percentage: m.protein_percentage,
            visceral_fat: m.visceral_fat,
            ideal_weight: m.ideal_weight,
        }
    }
}
