//! Split-key derivation.
//!
//! The content key is two independently derived 16-byte halves: one only the
//! password holder can compute, one that additionally requires the
//! custodian's deterministic ciphertext. All constants here are wire
//! contracts shared with every other implementation of the scheme.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use lethe_crypto::hash::{
    DIGEST_BYTES, HALF_BYTES, LOCAL_SALT, POST_REMOTE_SALT, PRE_REMOTE_SALT, hash_to_size,
};
use lethe_crypto::ContentKey;
use lethe_proto::AlgVersion;

use crate::flows::VaultError;

/// Hash the password for submission to the custodian.
///
/// Version tag `""` (absent) means the current default; unknown tags are
/// rejected here, at the point of use.
pub fn pre_custodian_hash(password: &str, version: &AlgVersion) -> Result<String, VaultError> {
    match version.pre_remote_hash.as_str() {
        "" | "1" => {
            let digest = hash_to_size(password.as_bytes(), PRE_REMOTE_SALT, DIGEST_BYTES)?;
            Ok(BASE64.encode(digest))
        },
        other => Err(VaultError::UnsupportedVersion {
            component: "pre-custodian hash",
            value: other.to_string(),
        }),
    }
}

/// Assemble the 32-byte content key from the password and the custodian's
/// ciphertext of the pre-hash.
pub fn derive_content_key(
    password: &str,
    encrypted_pre_hash: &str,
    version: &AlgVersion,
) -> Result<ContentKey, VaultError> {
    let local = match version.local_hash.as_str() {
        "" | "1" => hash_to_size(password.as_bytes(), LOCAL_SALT, HALF_BYTES)?,
        other => {
            return Err(VaultError::UnsupportedVersion {
                component: "local hash",
                value: other.to_string(),
            });
        },
    };

    let remote = match version.post_remote_hash.as_str() {
        "" | "1" => hash_to_size(encrypted_pre_hash.as_bytes(), POST_REMOTE_SALT, HALF_BYTES)?,
        other => {
            return Err(VaultError::UnsupportedVersion {
                component: "post-custodian hash",
                value: other.to_string(),
            });
        },
    };

    Ok(ContentKey::from_halves(&local, &remote)?)
}
