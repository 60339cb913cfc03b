//! HTTP-backed prediction engine
//!
//! Talks to a prediction engine service:
//!
//! - `POST {base}/predict` with `{"client_id", "metrics"}` returns a [`Prediction`]
//!   without the `client_id` field (the gateway echoes its own)
//! - `POST {base}/explain` with `{"metrics", "prediction"}` returns `{"explanation"}`

use super::{EngineError, Prediction, PredictionEngine};
use crate::gateway::metrics::{ClientId, MetricsRecord};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// Default engine request timeout
pub const DEFAULT_ENGINE_TIMEOUT_MS: u64 = 30_000;

/// Configuration for [`HttpEngine`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine base URL (`ENGINE_URL`)
    pub endpoint: String,
    /// Optional bearer token (`ENGINE_API_KEY`)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8500".to_string(),
            api_key: None,
            timeout_ms: DEFAULT_ENGINE_TIMEOUT_MS,
        }
    }
}

impl EngineConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_empty() {
            return Err("endpoint cannot be empty".to_string());
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err("endpoint must start with http:// or https://".to_string());
        }

        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct PredictBody<'a> {
    client_id: &'a ClientId,
    metrics: &'a MetricsRecord,
}

#[derive(Deserialize)]
struct PredictReply {
    triage: String,
    control_focus: String,
    health_distance: f64,
    pred_diab: f64,
    pred_bp: f64,
    pred_lip: f64,
}

#[derive(Serialize)]
struct ExplainBody<'a> {
    metrics: &'a MetricsRecord,
    prediction: &'a Prediction,
}

#[derive(Deserialize)]
struct ExplainReply {
    explanation: String,
}

/// Prediction engine reached over HTTP
#[derive(Clone)]
pub struct HttpEngine {
    client: Client,
    config: EngineConfig,
}

impl HttpEngine {
    /// Create an engine client with configuration
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::Unavailable)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| EngineError::Unavailable(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, EngineError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path);

        let mut request = self.client.post(&url).json(body);
        if let Some(ref api_key) = self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            error!(url = %url, error = %e, "Engine request failed");
            EngineError::Unavailable(e.to_string())
        })?;

        if !response.status().is_success() {
            return Err(EngineError::Rejected {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl PredictionEngine for HttpEngine {
    async fn predict(
        &self,
        client_id: &ClientId,
        metrics: &MetricsRecord,
    ) -> Result<Prediction, EngineError> {
        let reply: PredictReply = self
            .post("predict", &PredictBody { client_id, metrics })
            .await?;

        debug!(client_id = %client_id, triage = %reply.triage, "Engine prediction received");

        Ok(Prediction {
            client_id: client_id.clone(),
            triage: reply.triage,
            control_focus: reply.control_focus,
            health_distance: reply.health_distance,
            diabetes_risk: reply.pred_diab,
            blood_pressure_risk: reply.pred_bp,
            lipids_risk: reply.pred_lip,
        })
    }

    async fn explain(
        &self,
        metrics: &MetricsRecord,
        prediction: &Prediction,
    ) -> Result<String, EngineError> {
        let reply: ExplainReply = self
            .post("explain", &ExplainBody { metrics, prediction })
            .await?;

        Ok(reply.explanation)
    }
}
