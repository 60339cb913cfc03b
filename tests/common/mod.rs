//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use wellnessz_gateway::{
    build_router, AppState, Authorizer, ClientId, ClientSource, EngineError, MetricsRecord,
    Prediction, PredictionEngine, RequestOrchestrator,
};

pub const SECRET: &str = "test-secret";

/// Deterministic engine: scores from `bmi`, remembers every input record
#[derive(Default)]
pub struct StubEngine {
    pub seen: Mutex<Vec<(ClientId, MetricsRecord)>>,
}

impl StubEngine {
    pub fn seen(&self) -> Vec<(ClientId, MetricsRecord)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl PredictionEngine for StubEngine {
    async fn predict(
        &self,
        client_id: &ClientId,
        metrics: &MetricsRecord,
    ) -> Result<Prediction, EngineError> {
        self.seen
            .lock()
            .unwrap()
            .push((client_id.clone(), metrics.clone()));

        let bmi = metrics.get_f64("bmi").unwrap_or(22.0);
        Ok(Prediction {
            client_id: client_id.clone(),
            triage: if bmi >= 30.0 { "red" } else { "green" }.to_string(),
            control_focus: "weight".to_string(),
            health_distance: bmi / 10.0,
            diabetes_risk: 0.25,
            blood_pressure_risk: 0.5,
            lipids_risk: 0.75,
        })
    }

    async fn explain(
        &self,
        _metrics: &MetricsRecord,
        prediction: &Prediction,
    ) -> Result<String, EngineError> {
        Ok(format!("Triage {}.", prediction.triage))
    }
}

/// Router over `source` with a fresh stub engine
pub fn app(source: ClientSource) -> (Router, Arc<StubEngine>) {
    let engine = Arc::new(StubEngine::default());
    let orchestrator = RequestOrchestrator::new(source, engine.clone());
    let router = build_router(AppState::new(orchestrator, Authorizer::new(SECRET)));
    (router, engine)
}

pub fn bearer() -> String {
    format!("Bearer {}", SECRET)
}

pub fn post(uri: &str, auth: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(body.into()).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
