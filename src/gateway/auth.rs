//! Inbound request authorization
//!
//! A single shared secret gates every mutating endpoint. The caller must
//! present `Authorization: Bearer <secret>` exactly. There is no rate
//! limiting, rotation or per-route scope.

/// Header scheme expected in front of the secret
pub const BEARER_PREFIX: &str = "Bearer ";

/// Validates caller credentials against the configured secret
#[derive(Clone)]
pub struct Authorizer {
    expected: String,
}

impl Authorizer {
    /// Create an authorizer for `secret`
    pub fn new(secret: impl AsRef<str>) -> Self {
        Self {
            expected: format!("{}{}", BEARER_PREFIX, secret.as_ref()),
        }
    }

    /// Check the raw `Authorization` header value
    pub fn authorize(&self, presented: Option<&str>) -> bool {
        match presented {
            Some(value) => value == self.expected,
            None => false,
        }
    }
}

impl std::fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer").finish_non_exhaustive()
    }
}
