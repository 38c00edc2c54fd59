//! Request and response bodies of the custodian HTTP surface.
//!
//! Validation takes `now` as a parameter so the types stay free of ambient
//! clocks; transport code decides what "now" means.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest accepted content payload, in bytes.
pub const MAX_CONTENT_LEN: usize = 1000;

/// Furthest allowed expiration, in days from now.
pub const MAX_EXPIRATION_DAYS: i64 = 30;

/// Errors from request validation, reported to the caller verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Content was empty.
    #[error("content must not be empty")]
    EmptyContent,

    /// Content exceeded [`MAX_CONTENT_LEN`].
    #[error("content too long: {len} bytes > {MAX_CONTENT_LEN}")]
    ContentTooLong {
        /// Provided content length.
        len: usize,
    },

    /// The requested expiration is not in the future.
    #[error("expiration must be in the future")]
    ExpirationInPast,

    /// The requested expiration exceeds the maximum horizon.
    #[error("expiration must be within {MAX_EXPIRATION_DAYS} days")]
    ExpirationTooFar,

    /// No key id was provided.
    #[error("key_id must not be empty")]
    MissingKeyId,
}

/// `POST /new-key` body: bind a fresh key to `expiration` and encrypt
/// `content` under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewKeyRequest {
    /// Payload to encrypt (the client sends a salted password hash).
    pub content: String,
    /// When the new key must stop working.
    pub expiration: DateTime<Utc>,
}

impl NewKeyRequest {
    /// Check content bounds and the expiration window against `now`.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), RequestError> {
        validate_content(&self.content)?;

        if self.expiration <= now {
            return Err(RequestError::ExpirationInPast);
        }
        if self.expiration > now + Duration::days(MAX_EXPIRATION_DAYS) {
            return Err(RequestError::ExpirationTooFar);
        }

        Ok(())
    }
}

/// `POST /encrypt` body: re-encrypt `content` under the key bound to
/// `key_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptRequest {
    /// Payload to encrypt.
    pub content: String,
    /// Identifier of the previously created key.
    pub key_id: String,
}

impl EncryptRequest {
    /// Check content bounds and key id presence.
    pub fn validate(&self) -> Result<(), RequestError> {
        validate_content(&self.content)?;

        if self.key_id.is_empty() {
            return Err(RequestError::MissingKeyId);
        }

        Ok(())
    }
}

/// Wire metadata describing a freshly created key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetadata {
    /// Identifier the custodian bound the key to.
    pub key_id: String,
    /// When the key stops working.
    pub expiration: DateTime<Utc>,
    /// Serialized private half; the custodian keeps no copy.
    pub verification_key: String,
}

/// `POST /new-key` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewKeyResponse {
    /// Deterministic ciphertext of the request content.
    pub encrypted_content: String,
    /// The new key's metadata.
    pub metadata: KeyMetadata,
}

/// `POST /encrypt` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptResponse {
    /// Deterministic ciphertext of the request content.
    pub encrypted_content: String,
}

fn validate_content(content: &str) -> Result<(), RequestError> {
    if content.is_empty() {
        return Err(RequestError::EmptyContent);
    }
    if content.len() > MAX_CONTENT_LEN {
        return Err(RequestError::ContentTooLong { len: content.len() });
    }
    Ok(())
}
