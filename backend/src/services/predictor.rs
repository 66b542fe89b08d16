//! Gender and body-fat predictors
//!
//! Trained models supply these values as opaque black boxes. The pipeline
//! only depends on this trait; a missing prediction falls back to the
//! profile's declared gender and the intrinsic fat formula.

use smart_scale_shared::Gender;

/// Black-box predictions consumed by the measurement pipeline
pub trait Predictor: Send + Sync {
    /// Predict gender from a height/weight pair
    fn predict_gender(&self, height_cm: f64, weight_kg: f64) -> Option<Gender>;

    /// Predict body fat percentage
    fn predict_fat_percentage(
        &self,
        age_years: u32,
        gender: Gender,
        height_cm: f64,
        weight_kg: f64,
    ) -> Option<f64>;
}

/// Predictor that never predicts; the profile and the engine decide
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfilePredictor;

impl Predictor for ProfilePredictor {
    fn predict_gender(&self, _height_cm: f64, _weight_kg: f64) -> Option<Gender> {
        None
    }

    fn predict_fat_percentage(
        &self,
        _age_years: u32,
        _gender: Gender,
        _height_cm: f64,
        _weight_kg: f64,
    ) -> Option<f64> {
        None
    }
}

/// Fixed predictions, for wiring in values computed elsewhere
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPredictor {
    pub gender: Option<Gender>,
    pub fat_percentage: Option<f64>,
}

impl Predictor for FixedPredictor {
    fn predict_gender(&self, _height_cm: f64, _weight_kg: f64) -> Option<Gender> {
        self.gender
    }

    fn predict_fat_percentage(
        &self,
        _age_years: u32,
        _gender: Gender,
        _height_cm: f64,
        _weight_kg: f64,
    ) -> Option<f64> {
        self.fat_percentage
    }
}
