use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

use crate::context::LocationTables;
use crate::features::FeatureDefaults;
use crate::service::DEFAULT_LOCATION;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub defaults: FeatureDefaults,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_scaler_path")]
    pub scaler_path: String,
    #[serde(default = "default_model_path")]
    pub model_path: String,
    #[serde(default = "default_allow_fallback")]
    pub allow_fallback: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContextConfig {
    #[serde(default = "default_location")]
    pub default_location: String,
    #[serde(flatten)]
    pub tables: LocationTables,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub json_logs: bool,
    #[serde(default)]
    pub csv_logging: bool,
    #[serde(default = "default_csv_log_path")]
    pub csv_log_path: String,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 5000 }
fn default_scaler_path() -> String { "models/price_scaler.json".to_string() }
fn default_model_path() -> String { "models/price_model.json".to_string() }
fn default_allow_fallback() -> bool { true }
fn default_location() -> String { DEFAULT_LOCATION.to_string() }
fn default_csv_log_path() -> String { "predictions.csv".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            scaler_path: default_scaler_path(),
            model_path: default_model_path(),
            allow_fallback: default_allow_fallback(),
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            default_location: default_location(),
            tables: LocationTables::default(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            json_logs: false,
            csv_logging: false,
            csv_log_path: default_csv_log_path(),
        }
    }
}

/// Process environment, read after `.env` is applied.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub config_path: String,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Environment values take precedence over the file.
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(host) = &env.host {
            self.server.host = host.clone();
        }
        if let Some(port) = env.port {
            self.server.port = port;
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let port = match std::env::var("PRICER_PORT") {
            Ok(port) => Some(
                port.parse()
                    .with_context(|| format!("PRICER_PORT is not a valid port: {}", port))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            config_path: std::env::var("PRICER_CONFIG")
                .unwrap_or_else(|_| "config.toml".to_string()),
            host: std::env::var("PRICER_HOST").ok(),
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextProvider;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.model.model_path, "models/price_model.json");
        assert!(config.model.allow_fallback);
        assert_eq!(config.context.default_location, "mumbai");
        assert_eq!(config.defaults, FeatureDefaults::default());
        assert!(!config.monitoring.csv_logging);

        let provider = ContextProvider::new(config.context.tables);
        assert_eq!(provider.demand("goa"), 90);
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
            [server]
            port = 8080

            [model]
            scaler_path = "artifacts/scaler.json"
            model_path = "artifacts/forest.json"
            allow_fallback = false

            [context]
            default_location = "goa"

            [context.demand]
            Jaipur = 77

            [context.events.jaipur]
            count = 4
            major = true

            [context.fallback]
            demand = 65

            [defaults]
            booking_lead_time = 14.0

            [monitoring]
            csv_logging = true
            csv_log_path = "/tmp/audit.csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(!config.model.allow_fallback);
        assert_eq!(config.context.default_location, "goa");
        assert_eq!(config.defaults.booking_lead_time, 14.0);
        assert_eq!(config.defaults.base_price, 100.0);
        assert!(config.monitoring.csv_logging);

        let provider = ContextProvider::new(config.context.tables);
        assert_eq!(provider.demand("jaipur"), 77);
        assert_eq!(provider.demand("goa"), 65);
        assert_eq!(provider.events("JAIPUR").count, 4);
        // weather table was not overridden
        assert!(provider.weather("goa"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(&EnvConfig {
            config_path: "config.toml".to_string(),
            host: Some("127.0.0.1".to_string()),
            port: Some(9000),
        });
        assert_eq!(config.bind_address(), "127.0.0.1:9000");
    }

    #[test]
    fn test_shipped_config_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.server.port, 5000);

        let provider = ContextProvider::new(config.context.tables);
        assert_eq!(provider.demand("bangalore"), 75);
        assert!(provider.events("Mumbai").major);
        assert!(!provider.weather("delhi"));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(Config::parse("[server]\nport = \"high\"").is_err());
    }
}
