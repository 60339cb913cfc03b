//! HTTP surface
//!
//! Exposes the gateway over axum:
//! - `GET  /health`        - liveness probe, no auth
//! - `POST /predict`       - manual metrics payload
//! - `POST /predict/by-id` - identifier lookup through the configured source
//! - `POST /analyze`       - CSV upload scored row by row
//!
//! Handlers take the raw body, or its buffering rejection, so that the bearer
//! check runs before anything about the body is reported; an unauthenticated
//! caller gets 401 whatever it sent. JSON routes accept up to
//! [`MAX_JSON_BODY_BYTES`], `/analyze` up to [`MAX_UPLOAD_BYTES`]. Larger
//! bodies get 413 with the usual `{"error": ...}` envelope.

use crate::gateway::{
    AnalysisRecord, Authorizer, ClientId, Dataset, GatewayError, MetricsRecord, PredictRequest,
    RequestOrchestrator, ResponseEnvelope,
};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Body limit for the JSON prediction routes
pub const MAX_JSON_BODY_BYTES: usize = 1024 * 1024;

/// Body limit for CSV uploads on `/analyze`
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<RequestOrchestrator>,
    authorizer: Authorizer,
}

impl AppState {
    pub fn new(orchestrator: RequestOrchestrator, authorizer: Authorizer) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            authorizer,
        }
    }

    pub fn orchestrator(&self) -> &RequestOrchestrator {
        &self.orchestrator
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Build the gateway router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/predict/by-id", post(predict_by_id))
        .route(
            "/analyze",
            post(analyze).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .layer(DefaultBodyLimit::max(MAX_JSON_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ResponseEnvelope>, GatewayError> {
    let request_id = Uuid::new_v4();

    let result = async {
        authorize(&state, &headers)?;
        let body = buffered(body, MAX_JSON_BODY_BYTES)?;
        let mut object = parse_object(&body)?;

        let client_id = match object.get("client_id") {
            None | Some(Value::Null) => None,
            Some(value) => Some(ClientId::from_value(value).ok_or_else(|| {
                GatewayError::validation("client_id must be a string or number")
            })?),
        };
        let metrics = match object.remove("metrics") {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(MetricsRecord::from_map(map)),
            Some(_) => return Err(GatewayError::validation("metrics must be a JSON object")),
        };

        state
            .orchestrator
            .handle(PredictRequest::Manual { client_id, metrics })
            .await
    }
    .await;

    respond(request_id, "/predict", result)
}

async fn predict_by_id(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ResponseEnvelope>, GatewayError> {
    let request_id = Uuid::new_v4();

    let result = async {
        authorize(&state, &headers)?;
        let body = buffered(body, MAX_JSON_BODY_BYTES)?;
        let object = parse_object(&body)?;
        let client_id = object.get("client_id").and_then(ClientId::from_value);

        state
            .orchestrator
            .handle(PredictRequest::ById { client_id })
            .await
    }
    .await;

    respond(request_id, "/predict/by-id", result)
}

async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Vec<AnalysisRecord>>, GatewayError> {
    let request_id = Uuid::new_v4();

    let result = async {
        authorize(&state, &headers)?;
        let body = buffered(body, MAX_UPLOAD_BYTES)?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(GatewayError::validation("No file uploaded"));
        }

        let dataset = Dataset::from_reader(body.as_ref())
            .map_err(|e| GatewayError::validation(format!("invalid CSV upload: {}", e)))?;

        info!(request_id = %request_id, rows = dataset.len(), "CSV upload parsed");

        state.orchestrator.analyze_batch(dataset.into_rows()).await
    }
    .await;

    respond(request_id, "/analyze", result)
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), GatewayError> {
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if state.authorizer.authorize(presented) {
        Ok(())
    } else {
        Err(GatewayError::Unauthorized)
    }
}

fn buffered(body: Result<Bytes, BytesRejection>, limit: usize) -> Result<Bytes, GatewayError> {
    body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            GatewayError::PayloadTooLarge { limit }
        } else {
            GatewayError::validation(format!("unreadable request body: {}", rejection.body_text()))
        }
    })
}

fn parse_object(body: &[u8]) -> Result<Map<String, Value>, GatewayError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| GatewayError::validation(format!("invalid JSON body: {}", e)))?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(GatewayError::validation("invalid JSON body: expected an object")),
    }
}

fn respond<T>(
    request_id: Uuid,
    route: &'static str,
    result: Result<T, GatewayError>,
) -> Result<Json<T>, GatewayError> {
    match result {
        Ok(value) => Ok(Json(value)),
        Err(err) => {
            if err.status_code().is_server_error() {
                error!(
                    request_id = %request_id,
                    route,
                    code = err.code(),
                    error = %err,
                    "Request failed"
                );
            } else {
                warn!(
                    request_id = %request_id,
                    route,
                    code = err.code(),
                    status = err.status_code().as_u16(),
                    "Request rejected"
                );
            }
            Err(err)
        }
    }
}
