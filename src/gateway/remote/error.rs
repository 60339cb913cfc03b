//! Remote fetch errors

use thiserror::Error;

/// What went wrong during a remote fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteFetchErrorKind {
    /// Remote lookup is not the configured data mode
    Disabled,
    /// Base URL is missing or unusable
    NotConfigured,
    /// Upstream answered with a non-200 status
    Upstream,
    /// Upstream did not answer within the timeout
    Timeout,
    /// Connection-level failure
    Network,
    /// Upstream body is not a metrics object
    Malformed,
}

/// Error from the remote client-data service.
///
/// `status` is the upstream HTTP status when one was received, otherwise a
/// gateway-side status describing the failure (502/503/504/500).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RemoteFetchError {
    pub kind: RemoteFetchErrorKind,
    pub status: u16,
    pub message: String,
}

impl RemoteFetchError {
    pub fn disabled() -> Self {
        Self {
            kind: RemoteFetchErrorKind::Disabled,
            status: 500,
            message: "remote client lookup is disabled".to_string(),
        }
    }

    pub fn not_configured(detail: impl Into<String>) -> Self {
        Self {
            kind: RemoteFetchErrorKind::NotConfigured,
            status: 500,
            message: format!("remote client service not configured: {}", detail.into()),
        }
    }

    /// Upstream answered with a non-200 status. The response body is not
    /// carried into the message; it is logged at the call site.
    pub fn upstream(status: u16) -> Self {
        Self {
            kind: RemoteFetchErrorKind::Upstream,
            status,
            message: format!("client service returned {}", status),
        }
    }

    pub fn timeout(timeout_ms: u64) -> Self {
        Self {
            kind: RemoteFetchErrorKind::Timeout,
            status: 504,
            message: format!("client service timed out after {}ms", timeout_ms),
        }
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self {
            kind: RemoteFetchErrorKind::Network,
            status: 503,
            message: format!("client service unreachable: {}", detail.into()),
        }
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self {
            kind: RemoteFetchErrorKind::Malformed,
            status: 502,
            message: format!("client service returned a malformed body: {}", detail.into()),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == RemoteFetchErrorKind::Timeout
    }
}
