//! Remote client-data service configuration

use serde::{Deserialize, Serialize};

/// Timeout ceiling for a remote fetch
pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 10_000;

/// Configuration for [`RemoteClientFetcher`](super::RemoteClientFetcher)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Whether remote lookup is the active data mode
    pub enabled: bool,
    /// Service base URL (`CLIENT_API_BASE_URL`)
    pub base_url: Option<String>,
    /// Upstream bearer token (`CLIENT_API_TOKEN`)
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: None,
            api_token: None,
            timeout_ms: DEFAULT_REMOTE_TIMEOUT_MS,
        }
    }
}

impl RemoteConfig {
    /// Create config from environment variables
    pub fn from_env(enabled: bool) -> Self {
        Self {
            enabled,
            base_url: std::env::var("CLIENT_API_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            api_token: std::env::var("CLIENT_API_TOKEN")
                .ok()
                .filter(|s| !s.is_empty()),
            timeout_ms: std::env::var("CLIENT_API_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_REMOTE_TIMEOUT_MS),
        }
    }

    /// Validate configuration.
    ///
    /// A missing base URL is not an error here; it is reported per fetch.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref url) = self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("base_url must start with http:// or https://".to_string());
            }
        }

        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than 0".to_string());
        }

        Ok(())
    }
}
