//! Seal and open flows.
//!
//! The create flow binds a file to a fresh custodian key; the reuse flow
//! reconstructs the content key through the custodian's deterministic
//! re-encryption. Both verify the custodian's honesty before trusting its
//! ciphertext with anything.

use chrono::{DateTime, Utc};
use lethe_crypto::{AeadError, HashError, KeyError, RsaError, deserialize_private_key};
use lethe_proto::{AlgVersion, Artifact, FileMetadata};
use thiserror::Error;

use crate::custodian::{Custodian, CustodianError};
use crate::keying::{derive_content_key, pre_custodian_hash};

/// Errors from the seal/open protocol.
#[derive(Error, Debug)]
pub enum VaultError {
    /// The custodian call failed.
    #[error(transparent)]
    Custodian(#[from] CustodianError),

    /// The chunked RSA engine failed during the honesty check.
    #[error(transparent)]
    Rsa(#[from] RsaError),

    /// Sealing or opening the file body failed.
    #[error(transparent)]
    Aead(#[from] AeadError),

    /// Content-key derivation failed.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// The stored verification key could not be decoded.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The custodian's ciphertext did not decrypt back to the submitted
    /// hash. The custodian is misbehaving or holds the wrong key; nothing
    /// derived from its response can be trusted.
    #[error("custodian failed the honesty check: re-encrypted hash does not match")]
    HonestyCheckFailed,

    /// The file's expiration already passed; the custodian is not contacted.
    #[error("file expired at {expiration}: the custodian no longer holds its key")]
    AlreadyExpired {
        /// Expiration recorded in the file metadata.
        expiration: DateTime<Utc>,
    },

    /// The artifact names an algorithm version this build does not know.
    #[error("unsupported {component} version '{value}'")]
    UnsupportedVersion {
        /// Which of the four tagged algorithms is affected.
        component: &'static str,
        /// The unrecognized tag.
        value: String,
    },
}

/// Create flow: bind `content` to a fresh custodian key expiring at
/// `expiration` and return the sealed artifact.
pub fn seal_file(
    custodian: &impl Custodian,
    password: &str,
    expiration: DateTime<Utc>,
    content: &[u8],
) -> Result<Artifact, VaultError> {
    let version = AlgVersion::current();

    let pre_hash = pre_custodian_hash(password, &version)?;
    tracing::debug!(%expiration, "requesting new custodian key");
    let response = custodian.new_key(&pre_hash, expiration)?;

    verify_custodian(&pre_hash, &response.encrypted_content, &response.metadata.verification_key)?;
    tracing::debug!(key_id = %response.metadata.key_id, "honesty check passed");

    let content_key = derive_content_key(password, &response.encrypted_content, &version)?;
    let body = seal_body(content, &content_key, &version)?;

    Ok(Artifact {
        metadata: FileMetadata {
            key_id: response.metadata.key_id,
            expiration: response.metadata.expiration,
            verification_key: response.metadata.verification_key,
            server_address: custodian.address().to_string(),
            alg_version: version.to_string(),
        },
        body,
    })
}

/// Reuse flow: reconstruct the content key through the custodian and open
/// the artifact's body.
///
/// Fails without contacting the custodian when the metadata expiration is
/// already behind `now`.
pub fn open_file(
    custodian: &impl Custodian,
    artifact: &Artifact,
    password: &str,
    now: DateTime<Utc>,
) -> Result<Vec<u8>, VaultError> {
    let metadata = &artifact.metadata;
    if metadata.expiration < now {
        return Err(VaultError::AlreadyExpired { expiration: metadata.expiration });
    }

    let version = metadata.alg_version();
    let pre_hash = pre_custodian_hash(password, &version)?;

    tracing::debug!(key_id = %metadata.key_id, "requesting custodian re-encryption");
    let response = custodian.encrypt(&pre_hash, &metadata.key_id)?;

    // The stored private half, not a fresh one: the check proves the
    // custodian still holds the public half this file was bound to.
    verify_custodian(&pre_hash, &response.encrypted_content, &metadata.verification_key)?;
    tracing::debug!(key_id = %metadata.key_id, "honesty check passed");

    let content_key = derive_content_key(password, &response.encrypted_content, &version)?;
    open_body(&artifact.body, &content_key, &version)
}

/// Verify the custodian's deterministic ciphertext against the hash we sent.
///
/// Detects an unfaithful or buggy custodian, not one that has lied
/// consistently since the very first request: no independent trust anchor
/// exists in this scheme.
fn verify_custodian(
    expected_pre_hash: &str,
    encrypted: &str,
    serialized_key: &str,
) -> Result<(), VaultError> {
    let verification_key = deserialize_private_key(serialized_key)?;
    let decrypted = lethe_crypto::decrypt(encrypted, &verification_key)?;

    if decrypted != expected_pre_hash.as_bytes() {
        return Err(VaultError::HonestyCheckFailed);
    }
    Ok(())
}

fn seal_body(
    content: &[u8],
    key: &lethe_crypto::ContentKey,
    version: &AlgVersion,
) -> Result<Vec<u8>, VaultError> {
    match version.symmetric.as_str() {
        "" | "1" => Ok(lethe_crypto::seal(content, key.as_bytes())?),
        other => Err(VaultError::UnsupportedVersion {
            component: "symmetric cipher",
            value: other.to_string(),
        }),
    }
}

fn open_body(
    body: &[u8],
    key: &lethe_crypto::ContentKey,
    version: &AlgVersion,
) -> Result<Vec<u8>, VaultError> {
    match version.symmetric.as_str() {
        "" | "1" => Ok(lethe_crypto::open(body, key.as_bytes())?),
        other => Err(VaultError::UnsupportedVersion {
            component: "symmetric cipher",
            value: other.to_string(),
        }),
    }
}
