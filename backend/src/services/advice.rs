//! Health advice generation
//!
//! Sends the finished health record to a local LLM (Ollama) and returns the
//! generated commentary. Advice is best-effort: the pipeline logs failures
//! and carries on without it.

use crate::config::AdviceConfig;
use crate::error::ApiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use smart_scale_shared::HealthRecord;
use std::time::Duration;

/// Consumer of finished health records that produces advice text
#[async_trait]
pub trait AdviceSink: Send + Sync {
    async fn advise(&self, record: &HealthRecord) -> Result<String, ApiError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Ollama `/api/generate` client
#[derive(Clone)]
pub struct OllamaAdvisor {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaAdvisor {
    pub fn new(config: &AdviceConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.ollama_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl AdviceSink for OllamaAdvisor {
    async fn advise(&self, record: &HealthRecord) -> Result<String, ApiError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt: build_prompt(record),
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("advice request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Upstream(format!(
                "advice service returned {}",
                status
            )));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Upstream(format!("invalid advice response: {}", e)))?;

        Ok(generated.response.trim().to_string())
    }
}

/// Prompt listing every metric of the record
pub fn build_prompt(record: &HealthRecord) -> String {
    let m = &record.metrics;
    format!(
        "You are a health expert. Review every body metric below in detail and give \
         in-depth health recommendations. Answer in plain text bullet points, split into \
         an assessment section and a recommendations section.\n\
         Gender: {gender}\n\
         Weight: {weight:.2} kg\n\
         Age: {age} years\n\
         BMI: {bmi:.2}\n\
         BMR: {bmr:.0} kcal\n\
         TDEE: {tdee:.0} kcal\n\
         Lean body mass (LBM): {lbm:.2} kg\n\
         Fat percentage: {fat:.2}%\n\
         Water percentage: {water:.2}%\n\
         Bone mass: {bone:.2} kg\n\
         Muscle mass: {muscle:.2} kg\n\
         Protein percentage: {protein:.2}%\n\
         Visceral fat: {visceral:.1}\n\
         Ideal weight: {ideal:.1} kg",
        gender = m.gender,
        weight = record.weight_kg,
        age = record.age_years,
        bmi = m.bmi,
        bmr = m.bmr,
        tdee = m.tdee,
        lbm = m.lean_body_mass,
        fat = m.fat_percentage,
        water = m.water_percentage,
        bone = m.bone_mass,
        muscle = m.muscle_mass,
        protein = m.protein_percentage,
        visceral = m.visceral_fat,
        ideal = m.ideal_weight,
    )
}
