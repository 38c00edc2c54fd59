//! Custodian API seam and its HTTP implementation.
//!
//! Wire errors arrive as a closed [`ErrorCode`]; the exhaustive match here
//! is the only place custodian responses are interpreted, so adding a code
//! breaks the build instead of silently falling through.

use std::time::Duration;

use chrono::{DateTime, Utc};
use lethe_proto::{
    EncryptRequest, EncryptResponse, ErrorCode, ErrorResponse, NewKeyRequest, NewKeyResponse,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Route for creating a key and encrypting under it.
pub const NEW_KEY_ROUTE: &str = "/new-key";

/// Route for re-encrypting under an existing key.
pub const ENCRYPT_ROUTE: &str = "/encrypt";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from talking to the custodian.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustodianError {
    /// The key id is unknown to the custodian. The file is permanently
    /// unrecoverable if this custodian was the one that created the key.
    #[error(
        "key {key_id} does not exist on the custodian - it may have been purged after expiring, \
         or a different custodian created it"
    )]
    KeyNotFound {
        /// Requested key id.
        key_id: String,
    },

    /// The key has expired; the custodian reported when.
    #[error("key {key_id} expired at {expiration}")]
    KeyExpired {
        /// Requested key id.
        key_id: String,
        /// Expiration as reported by the custodian.
        expiration: String,
    },

    /// The custodian rejected the request as malformed.
    #[error("request rejected by custodian: {message}")]
    BadRequest {
        /// The custodian's description of the problem.
        message: String,
    },

    /// The custodian failed internally.
    #[error("custodian internal error: {message}")]
    Internal {
        /// The custodian's (generic) message.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("malformed custodian response: {reason}")]
    MalformedResponse {
        /// What failed while decoding.
        reason: String,
    },

    /// The request never completed (connection refused, timeout, ...).
    /// Recoverable: retrying is the caller's decision.
    #[error("custodian unreachable: {reason}")]
    Transport {
        /// Underlying transport failure.
        reason: String,
    },
}

impl CustodianError {
    /// Interpret a non-200 error body.
    fn from_response(response: ErrorResponse) -> Self {
        let field = |key: &str| response.data.get(key).cloned().unwrap_or_default();

        match response.error_code {
            ErrorCode::KeyNotFound => Self::KeyNotFound { key_id: field("key_id") },
            ErrorCode::KeyExpired => {
                Self::KeyExpired { key_id: field("key_id"), expiration: field("expiration") }
            },
            ErrorCode::BadRequest => {
                let detail = field("error");
                let message = if detail.is_empty() { response.message } else { detail };
                Self::BadRequest { message }
            },
            ErrorCode::InternalServerError => Self::Internal { message: response.message },
        }
    }
}

/// The custodian's two operations, plus the address to record in metadata.
pub trait Custodian {
    /// Base address identifying this custodian in file metadata.
    fn address(&self) -> &str;

    /// Create a key bound to `expiration` and encrypt `content` under it.
    fn new_key(
        &self,
        content: &str,
        expiration: DateTime<Utc>,
    ) -> Result<NewKeyResponse, CustodianError>;

    /// Re-encrypt `content` under the existing key `key_id`.
    fn encrypt(&self, content: &str, key_id: &str) -> Result<EncryptResponse, CustodianError>;
}

/// Blocking HTTP custodian client.
pub struct HttpCustodian {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpCustodian {
    /// Create a client for the custodian at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, CustodianError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CustodianError::Transport { reason: e.to_string() })?;

        Ok(Self { base_url, client })
    }

    fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        route: &str,
        body: &Req,
    ) -> Result<Resp, CustodianError> {
        let url = format!("{}{route}", self.base_url);
        tracing::debug!(%url, "custodian request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| CustodianError::Transport { reason: e.to_string() })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::debug!(%url, %status, "custodian returned an error");
            let error: ErrorResponse = response.json().map_err(|e| {
                CustodianError::MalformedResponse {
                    reason: format!("error body for status {status}: {e}"),
                }
            })?;
            return Err(CustodianError::from_response(error));
        }

        response
            .json()
            .map_err(|e| CustodianError::MalformedResponse { reason: e.to_string() })
    }
}

impl Custodian for HttpCustodian {
    fn address(&self) -> &str {
        &self.base_url
    }

    fn new_key(
        &self,
        content: &str,
        expiration: DateTime<Utc>,
    ) -> Result<NewKeyResponse, CustodianError> {
        let request = NewKeyRequest { content: content.to_string(), expiration };
        request
            .validate(Utc::now())
            .map_err(|e| CustodianError::BadRequest { message: e.to_string() })?;

        let response: NewKeyResponse = self.post(NEW_KEY_ROUTE, &request)?;
        tracing::info!(key_id = %response.metadata.key_id, "custodian created key");
        Ok(response)
    }

    fn encrypt(&self, content: &str, key_id: &str) -> Result<EncryptResponse, CustodianError> {
        let request = EncryptRequest { content: content.to_string(), key_id: key_id.to_string() };
        request.validate().map_err(|e| CustodianError::BadRequest { message: e.to_string() })?;

        self.post(ENCRYPT_ROUTE, &request)
    }
}

#[cfg(test)]
mod tests {
    use lethe_proto::{ErrorCode, ErrorResponse};

    use super::{Custodian, CustodianError};

    #[test]
    fn not_found_body_maps_to_key_not_found() {
        let response =
            ErrorResponse::new(ErrorCode::KeyNotFound, "key not found: k1").with_data("key_id", "k1");
        assert_eq!(
            CustodianError::from_response(response),
            CustodianError::KeyNotFound { key_id: "k1".to_string() }
        );
    }

    #[test]
    fn expired_body_preserves_expiration() {
        let response = ErrorResponse::new(ErrorCode::KeyExpired, "key k1 expired")
            .with_data("key_id", "k1")
            .with_data("expiration", "2026-05-01T00:00:00+00:00");

        let err = CustodianError::from_response(response);
        assert_eq!(
            err,
            CustodianError::KeyExpired {
                key_id: "k1".to_string(),
                expiration: "2026-05-01T00:00:00+00:00".to_string(),
            }
        );
        assert!(err.to_string().contains("expired at 2026-05-01"));
    }

    #[test]
    fn bad_request_prefers_structured_detail() {
        let response = ErrorResponse::new(ErrorCode::BadRequest, "failed to parse request")
            .with_data("error", "expiration must be in the future");
        assert_eq!(
            CustodianError::from_response(response),
            CustodianError::BadRequest { message: "expiration must be in the future".to_string() }
        );
    }

    #[test]
    fn internal_error_keeps_only_the_generic_message() {
        let response = ErrorResponse::new(ErrorCode::InternalServerError, "internal server error");
        assert_eq!(
            CustodianError::from_response(response),
            CustodianError::Internal { message: "internal server error".to_string() }
        );
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let custodian = super::HttpCustodian::new("http://localhost:8080/").unwrap();
        assert_eq!(custodian.address(), "http://localhost:8080");
    }
}
