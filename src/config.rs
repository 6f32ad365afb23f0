use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Model registry configuration
    pub registry: RegistryConfig,

    /// Serving configuration
    pub serving: ServingConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: CHURN__)
            .add_source(
                config::Environment::with_prefix("CHURN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Root of the file-backed tracking/registry store
    #[serde(default = "default_registry_root")]
    pub root: PathBuf,

    /// Registered model name to resolve at startup
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Registry stage to resolve (the serving-authoritative designation)
    #[serde(default = "default_stage")]
    pub stage: String,

    /// Experiment name used by the operational CLI
    #[serde(default = "default_experiment")]
    pub experiment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServingConfig {
    /// Decision threshold applied when the resolved training run carries
    /// no `threshold` parameter. The run parameter always wins.
    #[serde(default = "default_threshold")]
    pub default_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_registry_root() -> PathBuf {
    "./mlruns".into()
}

fn default_model_name() -> String {
    "telco-churn-model".to_string()
}

fn default_stage() -> String {
    "Production".to_string()
}

fn default_experiment() -> String {
    "Telco Churn".to_string()
}

fn default_threshold() -> f64 {
    0.35
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "churn-serving".to_string()
}

fn default_true() -> bool {
    true
}
