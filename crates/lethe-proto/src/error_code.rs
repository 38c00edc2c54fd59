//! Closed error taxonomy of the custodian HTTP surface.
//!
//! A closed enum rather than stringly-typed codes: transport boundaries
//! match on it exhaustively, so a new code is a compile error everywhere it
//! must be handled.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Machine-readable error category carried in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    /// The key id is unknown (never created, or already purged).
    KeyNotFound,
    /// The key exists in the grace window but has expired.
    KeyExpired,
    /// The request failed validation.
    BadRequest,
    /// Something unexpected failed inside the custodian.
    InternalServerError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::KeyNotFound => "key-not-found",
            Self::KeyExpired => "key-expired",
            Self::BadRequest => "bad-request",
            Self::InternalServerError => "internal-server-error",
        };
        f.write_str(code)
    }
}

/// Error body returned by the custodian on any non-200 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description.
    pub message: String,
    /// Machine-readable category.
    pub error_code: ErrorCode,
    /// Structured context (key id, expiration, ...), keyed by field name.
    pub data: BTreeMap<String, String>,
}

impl ErrorResponse {
    /// Build a response with no structured context.
    pub fn new(error_code: ErrorCode, message: impl Into<String>) -> Self {
        Self { message: message.into(), error_code, data: BTreeMap::new() }
    }

    /// Attach one structured context field.
    #[must_use]
    pub fn with_data(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorCode, ErrorResponse};

    #[test]
    fn codes_serialize_to_kebab_case() {
        for (code, wire) in [
            (ErrorCode::KeyNotFound, "\"key-not-found\""),
            (ErrorCode::KeyExpired, "\"key-expired\""),
            (ErrorCode::BadRequest, "\"bad-request\""),
            (ErrorCode::InternalServerError, "\"internal-server-error\""),
        ] {
            assert_eq!(serde_json::to_string(&code).unwrap(), wire);
            assert_eq!(serde_json::from_str::<ErrorCode>(wire).unwrap(), code);
        }
    }

    #[test]
    fn display_matches_wire_form() {
        assert_eq!(ErrorCode::KeyExpired.to_string(), "key-expired");
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(serde_json::from_str::<ErrorCode>("\"teapot\"").is_err());
    }

    #[test]
    fn data_fields_roundtrip() {
        let response = ErrorResponse::new(ErrorCode::KeyExpired, "key k expired")
            .with_data("key_id", "k")
            .with_data("expiration", "2026-01-01T00:00:00Z");

        let json = serde_json::to_string(&response).unwrap();
        let back: ErrorResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, response);
        assert_eq!(back.data["key_id"], "k");
    }
}
