//! Smart Scale WASM Module
//!
//! This crate provides WebAssembly bindings for the body composition
//! engine so a browser can preview metrics without a server round trip.

use serde::Serialize;
use smart_scale_shared::{
    body_composition, calculate_body_composition, CalculationOptions, Gender, MeasurementInput,
};
use wasm_bindgen::prelude::*;

fn gender(is_male: bool) -> Gender {
    if is_male {
        Gender::Male
    } else {
        Gender::Female
    }
}

/// Calculate BMI from weight (kg) and height (cm)
#[wasm_bindgen]
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    if height_cm <= 0.0 {
        return 0.0;
    }
    body_composition::calculate_bmi(weight_kg, height_cm)
}

/// Whether a reading is heavy enough to be a person of this height
#[wasm_bindgen]
pub fn is_meaningful_weight(weight_kg: f64, height_cm: f64) -> bool {
    height_cm > 0.0 && body_composition::is_meaningful_weight(weight_kg, height_cm)
}

/// Calculate BMR (revised Harris-Benedict)
#[wasm_bindgen]
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age_years: u32, is_male: bool) -> f64 {
    body_composition::calculate_bmr(weight_kg, height_cm, age_years, gender(is_male))
}

/// Calculate TDEE (Total Daily Energy Expenditure)
#[wasm_bindgen]
pub fn calculate_tdee(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    is_male: bool,
    activity_multiplier: f64,
) -> f64 {
    let (_, tdee) = body_composition::calculate_bmr_tdee(
        weight_kg,
        height_cm,
        age_years,
        gender(is_male),
        activity_multiplier,
    );
    tdee
}

#[derive(Serialize)]
struct ErrorJson<'a> {
    error: &'a str,
}

/// Full metrics record as JSON, using the default formula variants
///
/// Returns `{"error": ...}` for heights or weights the engine cannot use.
#[wasm_bindgen]
pub fn calculate_body_composition_json(
    height_cm: f64,
    weight_kg: f64,
    age_years: u32,
    is_male: bool,
    activity_factor: f64,
) -> String {
    let invalid = if !(height_cm.is_finite() && height_cm > 0.0) {
        Some("height must be positive")
    } else if !(weight_kg.is_finite() && weight_kg > 0.0) {
        Some("weight must be positive")
    } else {
        None
    };

    let json = match invalid {
        Some(error) => serde_json::to_string(&ErrorJson { error }),
        None => {
            let input = MeasurementInput {
                height_cm,
                weight_kg,
                age_years,
                gender: gender(is_male),
                activity_factor,
            };
            serde_json::to_string(&calculate_body_composition(
                &input,
                &CalculationOptions::default(),
            ))
        }
    };

    json.unwrap_or_else(|_| r#"{"error":"serialization failed"}"#.to_string())
}
