//! Authenticated encryption for the file body.
//!
//! ChaCha20-Poly1305 with a fresh random 96-bit nonce per seal, prepended to
//! the sealed output. No associated data. Tag failure is a distinct error
//! and never yields partial plaintext.

use chacha20poly1305::{
    ChaCha20Poly1305, Key, Nonce,
    aead::{Aead, KeyInit},
};
use rand::{RngCore, rngs::OsRng};
use thiserror::Error;

/// Nonce width of the IETF ChaCha20-Poly1305 construction.
const NONCE_BYTES: usize = 12;

/// Required content-key width.
pub const KEY_BYTES: usize = 32;

/// Errors from sealing and opening file bodies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AeadError {
    /// The key is not exactly [`KEY_BYTES`] bytes.
    #[error("content key must be {KEY_BYTES} bytes, got {len}")]
    InvalidKeyLength {
        /// Provided key length.
        len: usize,
    },

    /// The sealed blob cannot even hold the nonce.
    #[error("sealed blob too short: {len} bytes, need at least {NONCE_BYTES}")]
    TruncatedBlob {
        /// Provided blob length.
        len: usize,
    },

    /// The authentication tag did not verify: tampered blob or wrong key.
    #[error("authentication failed: blob was modified or the key is wrong")]
    AuthenticationFailed,
}

/// Seal content under a 32-byte key, returning `nonce ‖ ciphertext ‖ tag`.
pub fn seal(content: &[u8], key: &[u8]) -> Result<Vec<u8>, AeadError> {
    let cipher = cipher_for(key)?;

    let mut nonce = [0u8; NONCE_BYTES];
    OsRng.fill_bytes(&mut nonce);

    let Ok(sealed) = cipher.encrypt(Nonce::from_slice(&nonce), content) else {
        unreachable!("ChaCha20-Poly1305 encryption cannot fail with valid inputs");
    };

    let mut out = Vec::with_capacity(NONCE_BYTES + sealed.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Open a blob produced by [`seal`].
pub fn open(blob: &[u8], key: &[u8]) -> Result<Vec<u8>, AeadError> {
    let cipher = cipher_for(key)?;

    if blob.len() < NONCE_BYTES {
        return Err(AeadError::TruncatedBlob { len: blob.len() });
    }

    let (nonce, ciphertext) = blob.split_at(NONCE_BYTES);
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| AeadError::AuthenticationFailed)
}

fn cipher_for(key: &[u8]) -> Result<ChaCha20Poly1305, AeadError> {
    if key.len() != KEY_BYTES {
        return Err(AeadError::InvalidKeyLength { len: key.len() });
    }
    Ok(ChaCha20Poly1305::new(Key::from_slice(key)))
}

#[cfg(test)]
mod tests {
    use super::{AeadError, KEY_BYTES, NONCE_BYTES, open, seal};

    const KEY: [u8; KEY_BYTES] = [0x42; KEY_BYTES];

    #[test]
    fn seal_open_roundtrip() {
        let sealed = seal(b"attack at dawn", &KEY).unwrap();
        assert_eq!(open(&sealed, &KEY).unwrap(), b"attack at dawn");
    }

    #[test]
    fn roundtrip_empty_content() {
        let sealed = seal(b"", &KEY).unwrap();
        assert_eq!(open(&sealed, &KEY).unwrap(), b"");
    }

    #[test]
    fn nonce_is_fresh_per_seal() {
        let a = seal(b"same content", &KEY).unwrap();
        let b = seal(b"same content", &KEY).unwrap();
        assert_ne!(a[..NONCE_BYTES], b[..NONCE_BYTES]);
        assert_ne!(a, b);
    }

    #[test]
    fn short_key_rejected() {
        assert!(matches!(seal(b"x", &[0u8; 16]), Err(AeadError::InvalidKeyLength { len: 16 })));
        assert!(matches!(open(b"x", &[0u8; 31]), Err(AeadError::InvalidKeyLength { len: 31 })));
    }

    #[test]
    fn truncated_blob_rejected() {
        let blob = vec![0u8; NONCE_BYTES - 1];
        assert!(matches!(open(&blob, &KEY), Err(AeadError::TruncatedBlob { .. })));
    }

    #[test]
    fn every_flipped_bit_fails_authentication() {
        let sealed = seal(b"integrity", &KEY).unwrap();

        for byte in 0..sealed.len() {
            let mut tampered = sealed.clone();
            tampered[byte] ^= 0x01;
            assert!(
                matches!(open(&tampered, &KEY), Err(AeadError::AuthenticationFailed)),
                "flip at byte {byte} was not caught"
            );
        }
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let sealed = seal(b"secret", &KEY).unwrap();
        let mut other = KEY;
        other[0] ^= 0xFF;
        assert!(matches!(open(&sealed, &other), Err(AeadError::AuthenticationFailed)));
    }
}
