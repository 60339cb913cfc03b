//! Request orchestration
//!
//! Turns a predict request into a [`ResponseEnvelope`]:
//!
//! 1. Resolve metrics (manual payload, dataset lookup or remote lookup)
//! 2. Normalize the record
//! 3. Call the engine's `predict`, then `explain`
//! 4. Build the envelope
//!
//! Nothing here retries. Engine and source failures propagate as
//! [`GatewayError`] and are rendered by the HTTP layer.

use super::dataset::DatasetRow;
use super::engine::PredictionEngine;
use super::envelope::{AnalysisRecord, ResponseEnvelope};
use super::error::GatewayError;
use super::metrics::{ClientId, MetricsRecord};
use super::source::ClientSource;
use super::telemetry::{PredictionTelemetry, ResolutionKind};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// A predict request in one of the two accepted shapes
#[derive(Debug, Clone, PartialEq)]
pub enum PredictRequest {
    /// Caller supplies the metrics directly
    Manual {
        client_id: Option<ClientId>,
        metrics: Option<MetricsRecord>,
    },
    /// Caller supplies only an identifier
    ById { client_id: Option<ClientId> },
}

/// Top-level coordinator for predictions
pub struct RequestOrchestrator {
    /// Identifier resolution strategy
    source: ClientSource,
    /// Injected prediction engine
    engine: Arc<dyn PredictionEngine>,
    /// Span emitter
    telemetry: PredictionTelemetry,
}

impl RequestOrchestrator {
    pub fn new(source: ClientSource, engine: Arc<dyn PredictionEngine>) -> Self {
        Self {
            source,
            engine,
            telemetry: PredictionTelemetry::default(),
        }
    }

    pub fn source(&self) -> &ClientSource {
        &self.source
    }

    /// Handle a single predict request
    #[instrument(skip(self, request))]
    pub async fn handle(&self, request: PredictRequest) -> Result<ResponseEnvelope, GatewayError> {
        let started = Instant::now();

        let (resolution, client_id, metrics) = match request {
            PredictRequest::Manual { client_id, metrics } => {
                let metrics = metrics.ok_or_else(|| GatewayError::validation("metrics missing"))?;
                let client_id = client_id.unwrap_or_else(ClientId::unassigned);
                (ResolutionKind::Manual, client_id, metrics)
            }
            PredictRequest::ById { client_id } => {
                if !self.source.is_enabled() {
                    return Err(GatewayError::FeatureDisabled);
                }
                let client_id =
                    client_id.ok_or_else(|| GatewayError::validation("client_id missing"))?;
                let metrics = self.source.resolve(&client_id).await.map_err(|e| {
                    warn!(client_id = %client_id, error = %e, "Client lookup failed");
                    e
                })?;
                (ResolutionKind::Lookup(self.source.mode()), client_id, metrics)
            }
        };

        let metrics = metrics.normalize();

        let prediction = self.engine.predict(&client_id, &metrics).await?;
        let explanation = self.engine.explain(&metrics, &prediction).await?;

        let record = AnalysisRecord::from(prediction);

        self.telemetry.emit_prediction_span(
            resolution,
            &record,
            metrics.len(),
            started.elapsed().as_millis() as u64,
        );

        Ok(ResponseEnvelope::new(record, explanation))
    }

    /// Score every uploaded row in order.
    ///
    /// Rows without an identifier are scored as the unassigned client. The
    /// first engine failure aborts the batch.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn analyze_batch(
        &self,
        rows: Vec<DatasetRow>,
    ) -> Result<Vec<AnalysisRecord>, GatewayError> {
        let started = Instant::now();
        let mut records = Vec::with_capacity(rows.len());

        for row in rows {
            let client_id = row.client_id.unwrap_or_else(ClientId::unassigned);
            let metrics = row.metrics.normalize();

            let row_started = Instant::now();
            let prediction = self.engine.predict(&client_id, &metrics).await?;
            let record = AnalysisRecord::from(prediction);

            self.telemetry.emit_prediction_span(
                ResolutionKind::Batch,
                &record,
                metrics.len(),
                row_started.elapsed().as_millis() as u64,
            );
            records.push(record);
        }

        info!(
            scored = records.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Batch analysis complete"
        );

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::engine::{EngineError, Prediction};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Engine that echoes its inputs into the prediction
    #[derive(Default)]
    struct RecordingEngine {
        seen: Mutex<Vec<MetricsRecord>>,
        fail: bool,
    }

    #[async_trait]
    impl PredictionEngine for RecordingEngine {
        async fn predict(
            &self,
            client_id: &ClientId,
            metrics: &MetricsRecord,
        ) -> Result<Prediction, EngineError> {
            if self.fail {
                return Err(EngineError::Failed("model not loaded".to_string()));
            }
            self.seen.lock().unwrap().push(metrics.clone());
            Ok(Prediction {
                client_id: client_id.clone(),
                triage: "amber".to_string(),
                control_focus: "lipids".to_string(),
                health_distance: metrics.get_f64("bmi").unwrap_or(0.0),
                diabetes_risk: 0.2,
                blood_pressure_risk: 0.3,
                lipids_risk: 0.4,
            })
        }

        async fn explain(
            &self,
            _metrics: &MetricsRecord,
            prediction: &Prediction,
        ) -> Result<String, EngineError> {
            Ok(format!("{} focus", prediction.control_focus))
        }
    }

    fn orchestrator(source: ClientSource, engine: Arc<RecordingEngine>) -> RequestOrchestrator {
        RequestOrchestrator::new(source, engine)
    }

    #[tokio::test]
    async fn test_manual_defaults_client_and_normalizes() {
        let engine = Arc::new(RecordingEngine::default());
        let orch = orchestrator(ClientSource::Disabled, Arc::clone(&engine));

        let envelope = orch
            .handle(PredictRequest::Manual {
                client_id: None,
                metrics: Some(MetricsRecord::new().with("bmi", 27.1)),
            })
            .await
            .unwrap();

        assert_eq!(envelope.client_id, "unassigned");
        assert_eq!(envelope.health_distance, 27.1);
        assert_eq!(envelope.explanation, "lipids focus");

        let seen = engine.seen.lock().unwrap();
        assert_eq!(seen[0].get_f64("age"), Some(1.0));
        assert_eq!(seen[0].get_f64("sex"), Some(1.0));
    }

    #[tokio::test]
    async fn test_manual_without_metrics() {
        let orch = orchestrator(ClientSource::Disabled, Arc::new(RecordingEngine::default()));

        let err = orch
            .handle(PredictRequest::Manual {
                client_id: ClientId::parse("5"),
                metrics: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "metrics missing");
    }

    #[tokio::test]
    async fn test_by_id_disabled_wins_over_missing_id() {
        let orch = orchestrator(ClientSource::Disabled, Arc::new(RecordingEngine::default()));

        let with_id = orch
            .handle(PredictRequest::ById {
                client_id: ClientId::parse("5"),
            })
            .await
            .unwrap_err();
        let without_id = orch
            .handle(PredictRequest::ById { client_id: None })
            .await
            .unwrap_err();

        assert!(matches!(with_id, GatewayError::FeatureDisabled));
        assert!(matches!(without_id, GatewayError::FeatureDisabled));
    }

    #[tokio::test]
    async fn test_engine_failure_propagates() {
        let engine = Arc::new(RecordingEngine {
            fail: true,
            ..Default::default()
        });
        let orch = orchestrator(ClientSource::Disabled, engine);

        let err = orch
            .handle(PredictRequest::Manual {
                client_id: None,
                metrics: Some(MetricsRecord::new()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Engine(_)));
    }

    #[tokio::test]
    async fn test_analyze_batch_preserves_order() {
        let orch = orchestrator(ClientSource::Disabled, Arc::new(RecordingEngine::default()));
        let rows = vec![
            DatasetRow {
                client_id: ClientId::parse("b"),
                metrics: MetricsRecord::new().with("bmi", 30.0),
            },
            DatasetRow {
                client_id: None,
                metrics: MetricsRecord::new().with("bmi", 20.0),
            },
        ];

        let records = orch.analyze_batch(rows).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].client_id, "b");
        assert_eq!(records[1].client_id, "unassigned");
        assert_eq!(records[1].health_distance, 20.0);
    }
}
