//! Prediction telemetry
//!
//! Emits one OpenTelemetry span per completed prediction through the global
//! tracer. Without an installed provider the spans are no-ops.

use opentelemetry::trace::{Span, SpanKind, Tracer};
use opentelemetry::{global, KeyValue};
use tracing::info;

use super::config::DataMode;
use super::envelope::AnalysisRecord;

/// Tracer name used for gateway spans
pub const TRACER_NAME: &str = "wellnessz-gateway";

/// How the metrics for a prediction were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    Manual,
    Lookup(DataMode),
    Batch,
}

impl ResolutionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionKind::Manual => "manual",
            ResolutionKind::Lookup(DataMode::Csv) => "dataset",
            ResolutionKind::Lookup(DataMode::Remote) => "remote",
            ResolutionKind::Lookup(DataMode::None) => "disabled",
            ResolutionKind::Batch => "batch",
        }
    }
}

/// Telemetry emitter for predictions
pub struct PredictionTelemetry {
    tracer_name: String,
}

impl PredictionTelemetry {
    pub fn new(tracer_name: impl Into<String>) -> Self {
        Self {
            tracer_name: tracer_name.into(),
        }
    }

    /// Emit a span describing a finished prediction
    pub fn emit_prediction_span(
        &self,
        resolution: ResolutionKind,
        record: &AnalysisRecord,
        metric_fields: usize,
        duration_ms: u64,
    ) {
        let tracer = global::tracer(self.tracer_name.clone());

        let mut span = tracer
            .span_builder("prediction")
            .with_kind(SpanKind::Internal)
            .start(&tracer);

        span.set_attribute(KeyValue::new("client.id", record.client_id.clone()));
        span.set_attribute(KeyValue::new("resolution", resolution.as_str()));
        span.set_attribute(KeyValue::new("input.metric_fields", metric_fields as i64));
        span.set_attribute(KeyValue::new("output.triage", record.triage.clone()));
        span.set_attribute(KeyValue::new(
            "output.control_focus",
            record.control_focus.clone(),
        ));
        span.set_attribute(KeyValue::new("output.health_distance", record.health_distance));
        span.set_attribute(KeyValue::new("duration_ms", duration_ms as i64));

        span.end();

        info!(
            client_id = %record.client_id,
            resolution = resolution.as_str(),
            triage = %record.triage,
            duration_ms,
            "Prediction completed"
        );
    }
}

impl Default for PredictionTelemetry {
    fn default() -> Self {
        Self::new(TRACER_NAME)
    }
}
