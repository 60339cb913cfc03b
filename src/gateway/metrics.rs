//! Metrics records and client identifiers
//!
//! A [`MetricsRecord`] is the payload the prediction engine consumes. The
//! engine requires `age` and `sex`; everything else is optional and passed
//! through as-is. [`MetricsRecord::normalize`] is the only place defaults are
//! applied.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Default applied to `age` when absent
pub const DEFAULT_AGE: i64 = 1;

/// Default applied to `sex` when absent (encoded category)
pub const DEFAULT_SEX: i64 = 1;

/// Fields the engine cannot run without, with their conservative defaults
pub const REQUIRED_FIELDS: [(&str, i64); 2] = [("age", DEFAULT_AGE), ("sex", DEFAULT_SEX)];

/// Columns extracted from dataset rows and remote payloads
pub const CONSUMED_FIELDS: &[&str] = &[
    "age",
    "sex",
    "bmi",
    "visceral_fat",
    "muscle_index",
    "composite_index",
];

/// Sentinel client id for manual requests that do not name a client
pub const UNASSIGNED_CLIENT_ID: &str = "unassigned";

/// Mapping from field name to numeric/string value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsRecord(Map<String, Value>);

impl MetricsRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing JSON object
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Build a record holding only [`CONSUMED_FIELDS`] from a JSON object.
    ///
    /// Absent and null fields are omitted.
    pub fn extract_consumed(source: &Map<String, Value>) -> Self {
        let map = CONSUMED_FIELDS
            .iter()
            .filter_map(|field| match source.get(*field) {
                Some(Value::Null) | None => None,
                Some(value) => Some((field.to_string(), value.clone())),
            })
            .collect();
        Self(map)
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Insert a field, returning the previous value
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Get a field value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Whether a field is present with a non-null value
    pub fn has_value(&self, field: &str) -> bool {
        matches!(self.0.get(field), Some(v) if !v.is_null())
    }

    /// Numeric view of a field
    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.0.get(field).and_then(Value::as_f64)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fill required fields with their defaults.
    ///
    /// A required field that is absent or null receives its default. All
    /// other fields, null ones included, are copied unchanged. The input is
    /// left untouched and the operation is idempotent.
    pub fn normalize(&self) -> MetricsRecord {
        let mut normalized = self.clone();
        for (field, default) in REQUIRED_FIELDS {
            if !normalized.has_value(field) {
                normalized.0.insert(field.to_string(), Value::from(default));
            }
        }
        normalized
    }
}

impl From<Map<String, Value>> for MetricsRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Free-function form of [`MetricsRecord::normalize`]
pub fn normalize(partial: &MetricsRecord) -> MetricsRecord {
    partial.normalize()
}

/// Opaque client identifier.
///
/// Equality is exact on the coerced string form: JSON numbers render
/// without a fractional part when integral, strings are trimmed, and a
/// trailing `.0` on an integer-looking string is dropped. `42`, `"42"` and
/// `"42.0"` therefore address the same client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Coerce a raw string. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let canonical = match trimmed.strip_suffix(".0") {
            Some(int_part) if int_part.parse::<i64>().is_ok() => int_part,
            _ => trimmed,
        };

        Some(Self(canonical.to_string()))
    }

    /// Coerce a JSON value. Only strings and numbers name a client; null,
    /// booleans, blank strings and containers yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => Some(Self(number_to_id(n))),
            Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// The sentinel id used when a manual request omits `client_id`
    pub fn unassigned() -> Self {
        Self(UNASSIGNED_CLIENT_ID.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn number_to_id(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{:.0}", f),
        _ => n.to_string(),
    }
}

/// Convert a raw CSV cell into a JSON value.
///
/// Empty cells yield `None`, numeric cells become numbers, anything else is
/// kept as a string.
pub fn cell_value(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Value::from(i));
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if let Some(n) = Number::from_f64(f) {
            return Some(Value::Number(n));
        }
    }
    Some(Value::String(trimmed.to_string()))
}
