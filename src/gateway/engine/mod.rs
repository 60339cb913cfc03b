//! Prediction engine boundary
//!
//! The engine turns a metrics record into risk scores and a triage label,
//! and produces a narrative explanation for a scored row. Its internals are
//! opaque to the gateway; it is injected as a [`PredictionEngine`].

mod http;

pub use http::{EngineConfig, HttpEngine, DEFAULT_ENGINE_TIMEOUT_MS};

use super::metrics::{ClientId, MetricsRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a prediction engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// Engine could not be reached or timed out
    #[error("prediction engine unavailable: {0}")]
    Unavailable(String),

    /// Engine rejected the request
    #[error("prediction engine rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Engine answered with an unexpected body
    #[error("prediction engine returned an invalid response: {0}")]
    InvalidResponse(String),

    /// Engine failed while computing
    #[error("prediction engine failed: {0}")]
    Failed(String),
}

/// Scores produced by the engine for one client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Client the scores belong to
    pub client_id: ClientId,
    /// Triage label
    pub triage: String,
    /// Control-focus label
    pub control_focus: String,
    /// Health-distance score
    pub health_distance: f64,
    /// Diabetes risk
    #[serde(rename = "pred_diab")]
    pub diabetes_risk: f64,
    /// Blood-pressure risk
    #[serde(rename = "pred_bp")]
    pub blood_pressure_risk: f64,
    /// Lipid risk
    #[serde(rename = "pred_lip")]
    pub lipids_risk: f64,
}

/// External prediction engine
#[async_trait]
pub trait PredictionEngine: Send + Sync {
    /// Score one metrics record
    async fn predict(
        &self,
        client_id: &ClientId,
        metrics: &MetricsRecord,
    ) -> Result<Prediction, EngineError>;

    /// Produce the narrative for a scored row
    async fn explain(
        &self,
        metrics: &MetricsRecord,
        prediction: &Prediction,
    ) -> Result<String, EngineError>;
}
