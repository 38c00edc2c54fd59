//! AEAD-backed at-rest protection.
//!
//! Serialized public halves are sealed with ChaCha20-Poly1305 before they
//! reach storage and opened on the way out. Tokens are base64 so the
//! repository only ever sees printable strings.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use lethe_core::{DataProtection, ProtectionError};
use rand::{RngCore, rngs::OsRng};

const KEY_BYTES: usize = 32;

/// ChaCha20-Poly1305 protect/unprotect keyed from configuration.
#[derive(Clone)]
pub struct AeadProtection {
    key: [u8; KEY_BYTES],
}

impl AeadProtection {
    /// Build from a base64-encoded 32-byte key.
    pub fn from_base64(encoded: &str) -> Result<Self, ProtectionError> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| ProtectionError::new(format!("protection key is not base64: {e}")))?;

        let key: [u8; KEY_BYTES] = bytes.try_into().map_err(|_| {
            ProtectionError::new(format!("protection key must be {KEY_BYTES} bytes"))
        })?;

        Ok(Self { key })
    }

    /// Build with a fresh random key that lives only for this process.
    /// Anything protected with it is unreadable after a restart.
    pub fn ephemeral() -> Self {
        let mut key = [0u8; KEY_BYTES];
        OsRng.fill_bytes(&mut key);
        Self { key }
    }
}

impl DataProtection for AeadProtection {
    fn protect(&self, data: &str) -> Result<String, ProtectionError> {
        let sealed = lethe_crypto::seal(data.as_bytes(), &self.key)
            .map_err(|e| ProtectionError::new(e.to_string()))?;
        Ok(BASE64.encode(sealed))
    }

    fn unprotect(&self, token: &str) -> Result<String, ProtectionError> {
        let sealed = BASE64
            .decode(token)
            .map_err(|e| ProtectionError::new(format!("token is not base64: {e}")))?;

        let plain = lethe_crypto::open(&sealed, &self.key)
            .map_err(|e| ProtectionError::new(e.to_string()))?;

        String::from_utf8(plain)
            .map_err(|e| ProtectionError::new(format!("unprotected data is not UTF-8: {e}")))
    }
}
