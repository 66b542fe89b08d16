//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! All fields are Arc'd or internally Arc'd, so cloning per request is O(1).

use crate::config::AppConfig;
use crate::repositories::MeasurementRepository;
use crate::services::{
    AdviceSink, HttpTelemetryPublisher, OllamaAdvisor, Predictor, ProfilePredictor, TelemetrySink,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// CSV measurement history
    pub measurements: MeasurementRepository,
    /// Gender / fat-percentage predictor
    pub predictor: Arc<dyn Predictor>,
    /// Advice generator, `None` when advice is disabled
    pub advisor: Option<Arc<dyn AdviceSink>>,
    /// Telemetry publisher, `None` when telemetry is disabled
    pub telemetry: Option<Arc<dyn TelemetrySink>>,
    /// Prometheus render handle, `None` when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Build state from configuration
    ///
    /// The advice and telemetry clients are created only when enabled.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let measurements = MeasurementRepository::new(config.storage.csv_path.clone());

        let advisor: Option<Arc<dyn AdviceSink>> = if config.advice.enabled {
            info!(url = %config.advice.ollama_url, model = %config.advice.model, "Advice enabled");
            let client = OllamaAdvisor::new(&config.advice)
                .map_err(|e| anyhow::anyhow!("advice client: {}", e))?;
            Some(Arc::new(client))
        } else {
            None
        };

        let telemetry: Option<Arc<dyn TelemetrySink>> = if config.telemetry.enabled {
            info!(
                broker = %config.telemetry.base_url(),
                topic = %config.telemetry.topic,
                "Telemetry enabled"
            );
            let client = HttpTelemetryPublisher::new(&config.telemetry)
                .map_err(|e| anyhow::anyhow!("telemetry client: {}", e))?;
            Some(Arc::new(client))
        } else {
            None
        };

        Ok(Self {
            config: Arc::new(config),
            measurements,
            predictor: Arc::new(ProfilePredictor),
            advisor,
            telemetry,
            metrics: None,
        })
    }

    /// Replace the predictor
    pub fn with_predictor(mut self, predictor: Arc<dyn Predictor>) -> Self {
        self.predictor = predictor;
        self
    }

    /// Replace the advice sink
    pub fn with_advisor(mut self, advisor: Arc<dyn AdviceSink>) -> Self {
        self.advisor = Some(advisor);
        self
    }

    /// Replace the telemetry sink
    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Attach the Prometheus handle served on `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the measurement history
    #[inline]
    pub fn measurements(&self) -> &MeasurementRepository {
        &self.measurements
    }

    #[inline]
    pub fn predictor(&self) -> &dyn Predictor {
        self.predictor.as_ref()
    }

    #[inline]
    pub fn advisor(&self) -> Option<&dyn AdviceSink> {
        self.advisor.as_deref()
    }

    #[inline]
    pub fn telemetry(&self) -> Option<&dyn TelemetrySink> {
        self.telemetry.as_deref()
    }
}
