//! Scale simulator
//!
//! Stands in for a real scale during development: emits a random weight for
//! the configured demo profile every `interval_secs` and feeds it through the
//! measurement pipeline.

use crate::config::{DemoProfileConfig, ScaleConfig};
use crate::error::ApiError;
use crate::services::MeasurementService;
use crate::state::AppState;
use rand::Rng;
use smart_scale_shared::validation::parse_date_of_birth;
use smart_scale_shared::{Gender, ReadingSource, UserProfile};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Random weight in `[min_kg, max_kg]`, rounded to 2 decimals
pub fn generate_weight<R: Rng + ?Sized>(rng: &mut R, min_kg: f64, max_kg: f64) -> f64 {
    let raw = if max_kg > min_kg {
        rng.gen_range(min_kg..=max_kg)
    } else {
        min_kg
    };
    (raw * 100.0).round() / 100.0
}

/// Profile the simulator weighs
pub fn demo_profile(config: &DemoProfileConfig) -> Result<UserProfile, ApiError> {
    Ok(UserProfile {
        name: config.name.clone(),
        date_of_birth: parse_date_of_birth(&config.date_of_birth).map_err(ApiError::Validation)?,
        height_cm: config.height_cm,
        activity_level: config.activity_level,
        gender: config.gender.as_deref().map(Gender::from_label),
    })
}

/// Start the simulator loop if `scale.simulate` is set
pub fn spawn(state: AppState) -> Result<Option<JoinHandle<()>>, ApiError> {
    let scale: &ScaleConfig = &state.config().scale;
    if !scale.simulate {
        return Ok(None);
    }

    let profile = demo_profile(&scale.demo_profile)?;
    let (min_kg, max_kg) = (scale.min_weight_kg, scale.max_weight_kg);
    let period = Duration::from_secs(scale.interval_secs.max(1));

    info!(
        device = scale.model.device_name(),
        name = %profile.name,
        interval_secs = period.as_secs(),
        "Scale simulator started"
    );

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let weight_kg = generate_weight(&mut rand::thread_rng(), min_kg, max_kg);
            debug!(weight_kg, "Simulated reading");

            if let Err(e) = MeasurementService::process_reading(
                &state,
                profile.clone(),
                weight_kg,
                ReadingSource::Simulated,
            )
            .await
            {
                warn!(error = %e, weight_kg, "Simulated reading rejected");
            }
        }
    });

    Ok(Some(handle))
}
