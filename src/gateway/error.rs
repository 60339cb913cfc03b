//! Gateway error taxonomy
//!
//! Every failure is caught at the orchestrator boundary and rendered as
//! `{"error": "<message>"}` with the status code from
//! [`GatewayError::status_code`].

use super::dataset::DatasetError;
use super::engine::EngineError;
use super::remote::RemoteFetchError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Errors surfaced by the gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Caller input malformed or missing
    #[error("{0}")]
    Validation(String),

    /// Bad or missing bearer credential
    #[error("Unauthorized")]
    Unauthorized,

    /// Request body over the route's size limit
    #[error("request body exceeds the {limit}-byte limit")]
    PayloadTooLarge { limit: usize },

    /// Identifier has no matching record
    #[error("client not found")]
    NotFound,

    /// Client lookup is not configured
    #[error("Client lookup disabled")]
    FeatureDisabled,

    /// Upstream client-data service failed
    #[error(transparent)]
    RemoteFetch(#[from] RemoteFetchError),

    /// Dataset could not be loaded
    #[error(transparent)]
    DatasetUnavailable(#[from] DatasetError),

    /// Prediction engine failed
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl GatewayError {
    pub fn validation(message: impl Into<String>) -> Self {
        GatewayError::Validation(message.into())
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) | GatewayError::FeatureDisabled => StatusCode::BAD_REQUEST,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::RemoteFetch(_)
            | GatewayError::DatasetUnavailable(_)
            | GatewayError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable code for logs
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "VALIDATION_ERROR",
            GatewayError::Unauthorized => "UNAUTHORIZED",
            GatewayError::NotFound => "NOT_FOUND",
            GatewayError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            GatewayError::FeatureDisabled => "FEATURE_DISABLED",
            GatewayError::RemoteFetch(_) => "REMOTE_FETCH_ERROR",
            GatewayError::DatasetUnavailable(_) => "DATASET_UNAVAILABLE",
            GatewayError::Engine(_) => "ENGINE_ERROR",
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GatewayError::validation("metrics missing").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(GatewayError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(GatewayError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(GatewayError::FeatureDisabled.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            GatewayError::PayloadTooLarge { limit: 1024 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            GatewayError::from(RemoteFetchError::timeout(10)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::from(EngineError::Failed("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_public_messages() {
        assert_eq!(GatewayError::Unauthorized.body().error, "Unauthorized");
        assert_eq!(GatewayError::NotFound.body().error, "client not found");
        assert_eq!(GatewayError::FeatureDisabled.body().error, "Client lookup disabled");
        assert_eq!(
            GatewayError::from(RemoteFetchError::upstream(502)).body().error,
            "client service returned 502"
        );
    }
}
