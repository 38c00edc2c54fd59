//! Artifact file framing.
//!
//! One output file holds metadata JSON, a single 0x00 delimiter, and the raw
//! ciphertext. The null byte cannot appear inside valid JSON, so the first
//! occurrence is an unambiguous boundary.

use serde::de::Error as _;
use thiserror::Error;

use crate::metadata::FileMetadata;

/// Boundary byte between metadata JSON and ciphertext.
pub const DELIMITER: u8 = 0x00;

/// Errors from artifact encoding and decoding.
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// No delimiter byte separates metadata from ciphertext.
    #[error("invalid artifact: no delimiter between metadata and ciphertext")]
    MissingDelimiter,

    /// The metadata section is not valid JSON for [`FileMetadata`].
    #[error("invalid artifact metadata: {0}")]
    MalformedMetadata(#[from] serde_json::Error),
}

/// An encrypted artifact: sealed body plus the metadata needed to reopen it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// How to reconstruct the content key.
    pub metadata: FileMetadata,
    /// AEAD-sealed file body.
    pub body: Vec<u8>,
}

impl Artifact {
    /// Encode into the single-file on-disk form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        let metadata_json = serde_json::to_vec(&self.metadata)?;

        let mut out = Vec::with_capacity(metadata_json.len() + 1 + self.body.len());
        out.extend_from_slice(&metadata_json);
        out.push(DELIMITER);
        out.extend_from_slice(&self.body);
        Ok(out)
    }

    /// Decode the single-file on-disk form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let delimiter =
            bytes.iter().position(|&b| b == DELIMITER).ok_or(ArtifactError::MissingDelimiter)?;

        let metadata: FileMetadata = serde_json::from_slice(&bytes[..delimiter])?;
        if metadata.key_id.is_empty() {
            return Err(ArtifactError::MalformedMetadata(serde_json::Error::custom(
                "key_id must not be empty",
            )));
        }

        Ok(Self { metadata, body: bytes[delimiter + 1..].to_vec() })
    }
}
