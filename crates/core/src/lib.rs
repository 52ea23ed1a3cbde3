//! Shared primitives for all Rust crates in Proptrack.

#![forbid(unsafe_code)]

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across Proptrack crates.
pub type AppResult<T> = Result<T, AppError>;

/// Identifier of an externally owned record such as a document or a signer.
///
/// Upstream systems hand out both numeric keys and opaque string keys, so the
/// value keeps whichever shape it was given and serializes back to the same
/// JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Integer key.
    Number(i64),
    /// Opaque string key.
    Text(String),
}

impl RecordId {
    /// Parses a command-line or transport value, preferring the integer form.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        value
            .trim()
            .parse::<i64>()
            .map(Self::Number)
            .unwrap_or_else(|_| Self::Text(value.to_owned()))
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl Display for RecordId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(formatter, "{value}"),
            Self::Text(value) => write!(formatter, "{value}"),
        }
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller is blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::RecordId;

    #[test]
    fn record_id_parse_prefers_integers() {
        assert_eq!(RecordId::parse("42"), RecordId::Number(42));
        assert_eq!(RecordId::parse("doc-1"), RecordId::Text("doc-1".to_owned()));
    }

    #[test]
    fn record_id_keeps_json_shape() {
        let numeric = serde_json::to_string(&RecordId::Number(7)).unwrap_or_default();
        let text = serde_json::to_string(&RecordId::from("s1")).unwrap_or_default();
        assert_eq!(numeric, "7");
        assert_eq!(text, "\"s1\"");

        let restored: Result<RecordId, _> = serde_json::from_str("\"s1\"");
        assert!(matches!(restored, Ok(RecordId::Text(value)) if value == "s1"));
    }

    #[test]
    fn record_id_displays_raw_value() {
        assert_eq!(RecordId::Number(3).to_string(), "3");
        assert_eq!(RecordId::from("doc-1").to_string(), "doc-1");
    }
}
