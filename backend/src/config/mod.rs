//! Configuration management for the Smart Scale backend
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: SCALE__)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use smart_scale_shared::{ActivityLevel, CalculationOptions, FormulaVariant, ScaleModel};
use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub scale: ScaleConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub advice: AdviceConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Measurement history storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub csv_path: PathBuf,
}

/// Scale device and simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleConfig {
    pub model: ScaleModel,
    /// Generate fake readings instead of waiting for a real scale
    pub simulate: bool,
    pub min_weight_kg: f64,
    pub max_weight_kg: f64,
    pub interval_secs: u64,
    pub demo_profile: DemoProfileConfig,
}

/// Profile the simulator measures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoProfileConfig {
    pub name: String,
    pub date_of_birth: String,
    pub height_cm: f64,
    pub activity_level: ActivityLevel,
    pub gender: Option<String>,
}

/// Formula variant selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub protein_variant: FormulaVariant,
    #[serde(default)]
    pub ideal_weight_variant: FormulaVariant,
}

impl EngineConfig {
    pub fn options(&self) -> CalculationOptions {
        CalculationOptions {
            protein: self.protein_variant,
            ideal_weight: self.ideal_weight_variant,
        }
    }
}

/// AI/LLM advice configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceConfig {
    pub enabled: bool,
    pub ollama_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ollama_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Telemetry broker configuration
///
/// Records are published through the broker's HTTP publish API, so `broker`
/// may carry a scheme (`https://broker.example`); plain hosts use `http`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub broker: String,
    pub port: u16,
    pub topic: String,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: u64,
}

impl TelemetryConfig {
    /// Base URL of the broker's HTTP API
    pub fn base_url(&self) -> String {
        let broker = self.broker.trim_end_matches('/');
        if broker.contains("://") {
            format!("{}:{}", broker, self.port)
        } else {
            format!("http://{}:{}", broker, self.port)
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            broker: "localhost".to_string(),
            port: 18083,
            topic: "v1/devices/me/telemetry".to_string(),
            client_id: "smart-scale".to_string(),
            username: None,
            password: None,
            timeout_secs: 10,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            storage: StorageConfig {
                csv_path: PathBuf::from("user_data/user_data.csv"),
            },
            scale: ScaleConfig {
                model: ScaleModel::CrenotGofitS2,
                simulate: false,
                min_weight_kg: 50.0,
                max_weight_kg: 100.0,
                interval_secs: 3,
                demo_profile: DemoProfileConfig {
                    name: "Demo".to_string(),
                    date_of_birth: "01/01/2000".to_string(),
                    height_cm: 166.0,
                    activity_level: ActivityLevel::ModeratelyActive,
                    gender: Some("male".to_string()),
                },
            },
            engine: EngineConfig::default(),
            advice: AdviceConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with SCALE__ prefix
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Load from environment-specific config file
            .add_source(config::File::with_name(&config_file).required(false))
            // Override with environment variables (SCALE__ prefix)
            // e.g., SCALE__SERVER__PORT=9000 sets server.port
            .add_source(config::Environment::with_prefix("SCALE").separator("__"))
            .build()?;

        let loaded: AppConfig = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings the simulator or server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.scale.min_weight_kg > self.scale.max_weight_kg {
            anyhow::bail!(
                "scale.min_weight_kg ({}) exceeds scale.max_weight_kg ({})",
                self.scale.min_weight_kg,
                self.scale.max_weight_kg
            );
        }
        if self.scale.interval_secs == 0 {
            anyhow::bail!("scale.interval_secs must be positive");
        }
        if self.telemetry.enabled && self.telemetry.topic.trim().is_empty() {
            anyhow::bail!("telemetry.topic must not be empty");
        }
        Ok(())
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}
