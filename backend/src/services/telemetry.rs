//! Telemetry publishing
//!
//! Every finished record is published to the device topic of a message
//! broker through its HTTP publish API (`POST /api/v5/publish`). Publishing
//! is best-effort, like advice.

use crate::config::TelemetryConfig;
use crate::error::ApiError;
use async_trait::async_trait;
use serde::Serialize;
use smart_scale_shared::{HealthRecord, MetricsRecord};
use std::time::Duration;

/// Consumer of finished health records that forwards them off-device
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn publish(&self, record: &HealthRecord) -> Result<(), ApiError>;
}

/// Telemetry message body: the weight plus every metric
#[derive(Debug, Serialize)]
pub struct TelemetryPayload<'a> {
    pub name: &'a str,
    pub weight: f64,
    pub age: u32,
    #[serde(flatten)]
    pub metrics: &'a MetricsRecord,
}

impl<'a> From<&'a HealthRecord> for TelemetryPayload<'a> {
    fn from(record: &'a HealthRecord) -> Self {
        Self {
            name: &record.profile.name,
            weight: record.weight_kg,
            age: record.age_years,
            metrics: &record.metrics,
        }
    }
}

#[derive(Serialize)]
struct PublishRequest<'a> {
    topic: &'a str,
    clientid: &'a str,
    payload: String,
    qos: u8,
    retain: bool,
}

/// Broker HTTP publish client
#[derive(Clone)]
pub struct HttpTelemetryPublisher {
    client: reqwest::Client,
    url: String,
    topic: String,
    client_id: String,
    username: Option<String>,
    password: Option<String>,
}

impl HttpTelemetryPublisher {
    pub fn new(config: &TelemetryConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            url: format!("{}/api/v5/publish", config.base_url()),
            topic: config.topic.clone(),
            client_id: config.client_id.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

#[async_trait]
impl TelemetrySink for HttpTelemetryPublisher {
    async fn publish(&self, record: &HealthRecord) -> Result<(), ApiError> {
        let payload = serde_json::to_string(&TelemetryPayload::from(record))
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("telemetry payload: {}", e)))?;

        let body = PublishRequest {
            topic: &self.topic,
            clientid: &self.client_id,
            payload,
            qos: 1,
            retain: false,
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("telemetry publish failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Upstream(format!(
                "telemetry broker returned {}",
                status
            )));
        }

        Ok(())
    }
}
