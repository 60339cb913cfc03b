//! Remote client-data service fetcher
//!
//! `GET {base_url}/clients/{client_id}` with the upstream bearer token.
//! The response body is either a flat metrics object or one wrapped as
//! `{"metrics": {...}}`.

use super::{error::RemoteFetchError, types::RemoteConfig};
use crate::gateway::metrics::{ClientId, MetricsRecord};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Upstream error bodies are cut to this many characters in logs
const MAX_LOGGED_BODY: usize = 512;

/// Client for the upstream client-data service
#[derive(Clone)]
pub struct RemoteClientFetcher {
    /// HTTP client carrying the timeout ceiling
    client: Client,
    /// Configuration
    config: RemoteConfig,
}

impl RemoteClientFetcher {
    /// Create a fetcher with configuration
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteFetchError> {
        config
            .validate()
            .map_err(RemoteFetchError::not_configured)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| RemoteFetchError::not_configured(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get configuration
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Fetch a client's metrics from the upstream service.
    ///
    /// The returned record is normalized. Failures are returned immediately.
    #[instrument(skip(self), fields(client_id = %id))]
    pub async fn fetch(&self, id: &ClientId) -> Result<MetricsRecord, RemoteFetchError> {
        if !self.config.enabled {
            return Err(RemoteFetchError::disabled());
        }

        let url = self.client_url(id)?;

        let mut request = self.client.get(url.clone());
        if let Some(ref token) = self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                url = %url,
                body = %truncate(body.trim(), MAX_LOGGED_BODY),
                "Client service returned an error"
            );
            return Err(RemoteFetchError::upstream(status.as_u16()));
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                RemoteFetchError::timeout(self.config.timeout_ms)
            } else {
                RemoteFetchError::malformed(e.to_string())
            }
        })?;

        let metrics = extract_metrics(&body)?;
        debug!(fields = metrics.len(), "Fetched client metrics");

        Ok(metrics.normalize())
    }

    fn client_url(&self, id: &ClientId) -> Result<Url, RemoteFetchError> {
        let base = self
            .config
            .base_url
            .as_deref()
            .ok_or_else(|| RemoteFetchError::not_configured("CLIENT_API_BASE_URL is not set"))?;

        let mut url =
            Url::parse(base).map_err(|e| RemoteFetchError::not_configured(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| RemoteFetchError::not_configured("base URL cannot carry a path"))?
            .pop_if_empty()
            .push("clients")
            .push(id.as_str());

        Ok(url)
    }

    fn map_transport(&self, e: reqwest::Error) -> RemoteFetchError {
        if e.is_timeout() {
            warn!(timeout_ms = self.config.timeout_ms, "Client service timed out");
            RemoteFetchError::timeout(self.config.timeout_ms)
        } else {
            warn!(error = %e, "Client service unreachable");
            RemoteFetchError::network(e.to_string())
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Pull the consumed metric fields out of an upstream body
fn extract_metrics(body: &Value) -> Result<MetricsRecord, RemoteFetchError> {
    let object = body
        .as_object()
        .ok_or_else(|| RemoteFetchError::malformed("expected a JSON object"))?;

    let source = match object.get("metrics") {
        Some(Value::Object(inner)) => inner,
        Some(_) => return Err(RemoteFetchError::malformed("`metrics` must be an object")),
        None => object,
    };

    Ok(MetricsRecord::extract_consumed(source))
}
