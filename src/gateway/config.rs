//! Gateway configuration
//!
//! Loaded from environment variables at startup.
//!
//! # Environment
//!
//! Required:
//! - `API_SECRET`: shared secret for inbound `Authorization: Bearer` checks
//! - `ENGINE_URL`: prediction engine base URL
//!
//! Optional:
//! - `DATA_MODE`: `NONE` | `CSV` | `REMOTE` (default `NONE`)
//! - `CLIENT_CSV_PATH`: dataset location in CSV mode (default `clients.csv`)
//! - `CLIENT_API_BASE_URL`, `CLIENT_API_TOKEN`, `CLIENT_API_TIMEOUT_MS`: REMOTE mode
//! - `ENGINE_API_KEY`, `ENGINE_TIMEOUT_MS`: engine client settings

use super::dataset::DEFAULT_DATASET_PATH;
use super::engine::{EngineConfig, DEFAULT_ENGINE_TIMEOUT_MS};
use super::remote::RemoteConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Required environment variables
pub const REQUIRED_ENV_VARS: &[&str] = &["API_SECRET", "ENGINE_URL"];

/// Which strategy resolves client identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataMode {
    /// Identifier lookups disabled
    #[default]
    None,
    /// Lookups against a cached CSV dataset
    Csv,
    /// Lookups against the remote client-data service
    Remote,
}

impl DataMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataMode::None => "NONE",
            DataMode::Csv => "CSV",
            DataMode::Remote => "REMOTE",
        }
    }
}

impl fmt::Display for DataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "" | "NONE" => Ok(DataMode::None),
            "CSV" => Ok(DataMode::Csv),
            "REMOTE" => Ok(DataMode::Remote),
            _ => Err(ConfigError::InvalidValue {
                var: "DATA_MODE".to_string(),
                expected: "NONE | CSV | REMOTE".to_string(),
                actual: s.to_string(),
            }),
        }
    }
}

/// Full gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Inbound shared secret
    pub api_secret: String,
    /// Active data mode
    pub data_mode: DataMode,
    /// Dataset path for CSV mode
    pub dataset_path: PathBuf,
    /// Remote client-data service settings
    pub remote: RemoteConfig,
    /// Prediction engine settings
    pub engine: EngineConfig,
}

impl GatewayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::validate_env().map_err(|missing| {
            ConfigError::Multiple(missing.into_iter().map(ConfigError::MissingEnvVar).collect())
        })?;

        let api_secret = required_var("API_SECRET")?;
        if api_secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                var: "API_SECRET".to_string(),
                expected: "a non-empty secret".to_string(),
                actual: String::new(),
            });
        }

        let data_mode = match std::env::var("DATA_MODE") {
            Ok(raw) => raw.parse()?,
            Err(_) => DataMode::default(),
        };

        let dataset_path = std::env::var("CLIENT_CSV_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH));

        let remote = RemoteConfig::from_env(data_mode == DataMode::Remote);
        remote.validate().map_err(|e| ConfigError::InvalidValue {
            var: "CLIENT_API_BASE_URL".to_string(),
            expected: "a valid http(s) URL".to_string(),
            actual: e,
        })?;

        let engine = engine_from_env()?;

        Ok(Self {
            api_secret,
            data_mode,
            dataset_path,
            remote,
            engine,
        })
    }

    /// Check that all required environment variables are present
    pub fn validate_env() -> Result<(), Vec<String>> {
        let missing: Vec<String> = REQUIRED_ENV_VARS
            .iter()
            .filter(|var| std::env::var(var).is_err())
            .map(|s| s.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }
}

/// Load the prediction engine settings alone.
///
/// The batch CLI needs the engine but none of the inbound server settings.
pub fn engine_from_env() -> Result<EngineConfig, ConfigError> {
    let engine = EngineConfig {
        endpoint: required_var("ENGINE_URL")?,
        api_key: std::env::var("ENGINE_API_KEY").ok().filter(|s| !s.is_empty()),
        timeout_ms: std::env::var("ENGINE_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_ENGINE_TIMEOUT_MS),
    };

    engine.validate().map_err(|e| ConfigError::InvalidValue {
        var: "ENGINE_URL".to_string(),
        expected: "a valid http(s) URL".to_string(),
        actual: e,
    })?;

    Ok(engine)
}

fn required_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing
    #[error("Required environment variable '{0}' is not set")]
    MissingEnvVar(String),

    /// Environment variable has invalid value
    #[error("Environment variable '{var}' has invalid value: expected '{expected}', got '{actual}'")]
    InvalidValue {
        var: String,
        expected: String,
        actual: String,
    },

    /// Multiple configuration errors
    #[error("Multiple configuration errors:\n{}", list_errors(.0))]
    Multiple(Vec<ConfigError>),
}

fn list_errors(errors: &[ConfigError]) -> String {
    errors.iter().map(|err| format!("  - {}\n", err)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_mode_parsing() {
        assert_eq!("CSV".parse::<DataMode>().unwrap(), DataMode::Csv);
        assert_eq!("remote".parse::<DataMode>().unwrap(), DataMode::Remote);
        assert_eq!(" none ".parse::<DataMode>().unwrap(), DataMode::None);
        assert_eq!("".parse::<DataMode>().unwrap(), DataMode::None);
    }

    #[test]
    fn test_data_mode_rejects_unknown() {
        let err = "postgres".parse::<DataMode>().unwrap_err();
        assert!(err.to_string().contains("DATA_MODE"));
        assert!(err.to_string().contains("postgres"));
    }

    #[test]
    fn test_data_mode_serde_uses_uppercase() {
        assert_eq!(serde_json::to_string(&DataMode::Remote).unwrap(), "\"REMOTE\"");
        assert_eq!(DataMode::Csv.to_string(), "CSV");
    }

    #[test]
    fn test_multiple_errors_display() {
        let err = ConfigError::Multiple(vec![
            ConfigError::MissingEnvVar("API_SECRET".to_string()),
            ConfigError::MissingEnvVar("ENGINE_URL".to_string()),
        ]);
        let text = err.to_string();
        assert_eq!(
            text,
            "Multiple configuration errors:\n  \
             - Required environment variable 'API_SECRET' is not set\n  \
             - Required environment variable 'ENGINE_URL' is not set\n"
        );
    }
}
