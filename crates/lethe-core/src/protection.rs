//! At-rest protection capability.
//!
//! Key material crosses a protect/unprotect boundary before it touches
//! storage. The lifecycle store only sees opaque tokens; the cipher behind
//! them is the embedding binary's choice.

use thiserror::Error;

/// Error from a protection backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("data protection: {reason}")]
pub struct ProtectionError {
    /// What failed.
    pub reason: String,
}

impl ProtectionError {
    /// Build an error from any displayable cause.
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Reversible at-rest transformation of serialized key material.
pub trait DataProtection: Clone + Send + Sync + 'static {
    /// Wrap plaintext into an opaque token.
    fn protect(&self, data: &str) -> Result<String, ProtectionError>;

    /// Recover plaintext from a token produced by [`Self::protect`].
    fn unprotect(&self, token: &str) -> Result<String, ProtectionError>;
}

/// Identity protection for tests and development setups without an at-rest
/// key. Tokens equal their plaintext.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainProtection;

impl DataProtection for PlainProtection {
    fn protect(&self, data: &str) -> Result<String, ProtectionError> {
        Ok(data.to_string())
    }

    fn unprotect(&self, token: &str) -> Result<String, ProtectionError> {
        Ok(token.to_string())
    }
}
