//! Salted truncated hashing and the split content key.
//!
//! Every half of the content key is a salted SHA-256 truncation. The salt
//! strings and truncation sizes are wire constants: both sides of the
//! protocol must produce bit-identical values.

use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Salt for the locally-held half of the content key.
pub const LOCAL_SALT: &str = "local";

/// Salt applied to the password before it is sent for custodian encryption.
pub const PRE_REMOTE_SALT: &str = "before_encryption";

/// Salt applied to the custodian ciphertext to form the remote half.
pub const POST_REMOTE_SALT: &str = "remote";

/// SHA-256 digest width; the upper bound for [`hash_to_size`].
pub const DIGEST_BYTES: usize = 32;

/// Width of each content-key half.
pub const HALF_BYTES: usize = 16;

/// Errors from hashing and content-key assembly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// More bytes were requested than SHA-256 produces.
    #[error("requested {requested} bytes, SHA-256 only yields {DIGEST_BYTES}")]
    SizeTooLarge {
        /// Requested truncation size.
        requested: usize,
    },

    /// A content-key half had the wrong width.
    #[error("content-key halves must be {HALF_BYTES} bytes each, got {local} and {remote}")]
    BadHalfLength {
        /// Local half length.
        local: usize,
        /// Remote half length.
        remote: usize,
    },
}

/// Hash `input ‖ salt` with SHA-256 and truncate to `size` bytes.
pub fn hash_to_size(input: &[u8], salt: &str, size: usize) -> Result<Vec<u8>, HashError> {
    if size > DIGEST_BYTES {
        return Err(HashError::SizeTooLarge { requested: size });
    }

    let mut hasher = Sha256::new();
    hasher.update(input);
    hasher.update(salt.as_bytes());
    Ok(hasher.finalize()[..size].to_vec())
}

/// The 32-byte symmetric key sealing a file body: a locally-derived half
/// followed by a custodian-dependent half. Wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ContentKey {
    bytes: [u8; 2 * HALF_BYTES],
}

impl ContentKey {
    /// Assemble from the two 16-byte halves.
    pub fn from_halves(local: &[u8], remote: &[u8]) -> Result<Self, HashError> {
        if local.len() != HALF_BYTES || remote.len() != HALF_BYTES {
            return Err(HashError::BadHalfLength { local: local.len(), remote: remote.len() });
        }

        let mut bytes = [0u8; 2 * HALF_BYTES];
        bytes[..HALF_BYTES].copy_from_slice(local);
        bytes[HALF_BYTES..].copy_from_slice(remote);
        Ok(Self { bytes })
    }

    /// Raw key material, for the AEAD wrapper.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl core::fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ContentKey").finish_non_exhaustive()
    }
}
