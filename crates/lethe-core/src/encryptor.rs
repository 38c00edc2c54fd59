//! Custodian encryptor service.
//!
//! The logic behind both HTTP routes: mint a key pair bound to a fresh id
//! and encrypt content under it, or re-encrypt under an existing key. The
//! private half passes straight through to the caller; the custodian stores
//! only the protected public half, which is the trust boundary the whole
//! scheme rests on.

use chrono::{DateTime, Utc};
use lethe_crypto::{KeyError, RsaError, serialize_private_key};
use thiserror::Error;
use uuid::Uuid;

use crate::clock::Clock;
use crate::keystore::{BroadcastKey, KeyStore, KeyStoreError};
use crate::protection::DataProtection;
use crate::repository::KeyRepository;

/// Errors from the encryptor service.
#[derive(Error, Debug)]
pub enum EncryptorError {
    /// Key-pair generation failed.
    #[error("key generation: {0}")]
    Generation(#[from] KeyError),

    /// The chunked RSA engine rejected the operation.
    #[error(transparent)]
    Rsa(#[from] RsaError),

    /// The lifecycle store rejected the operation.
    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),
}

/// Result of minting a new key and encrypting under it.
#[derive(Debug, Clone)]
pub struct NewKeyResult {
    /// Fresh key id the public half is stored under.
    pub key_id: String,
    /// When the key stops working.
    pub expiration: DateTime<Utc>,
    /// Serialized private half; the only copy that will ever exist.
    pub verification_key: String,
    /// Deterministic ciphertext of the submitted content.
    pub encrypted_content: String,
}

/// The custodian's encryption service over a lifecycle store.
#[derive(Debug, Clone)]
pub struct Encryptor<R, P, C> {
    key_store: KeyStore<R, P, C>,
}

impl<R: KeyRepository, P: DataProtection, C: Clock> Encryptor<R, P, C> {
    /// Wrap a lifecycle store.
    pub fn new(key_store: KeyStore<R, P, C>) -> Self {
        Self { key_store }
    }

    /// Mint a key pair, bind its public half to a fresh key id with the
    /// given expiration, and encrypt `content` under it.
    pub fn create_new_key_and_encrypt(
        &self,
        content: &str,
        expiration: DateTime<Utc>,
    ) -> Result<NewKeyResult, EncryptorError> {
        let pair = lethe_crypto::generate()?;
        let key_id = Uuid::new_v4().to_string();

        let key = BroadcastKey { key_id: key_id.clone(), expiration, public: pair.public.clone() };
        self.key_store.store(&key)?;

        let encrypted_content = lethe_crypto::encrypt(content.as_bytes(), &pair.public)?;

        Ok(NewKeyResult {
            key_id,
            expiration,
            verification_key: serialize_private_key(&pair.private),
            encrypted_content,
        })
    }

    /// Re-encrypt `content` under the key bound to `key_id`.
    ///
    /// Deterministic: a live key reproduces byte-identical ciphertext for
    /// identical content on every call.
    pub fn encrypt_with_existing(
        &self,
        content: &str,
        key_id: &str,
    ) -> Result<String, EncryptorError> {
        let key = self.key_store.get(key_id)?;
        Ok(lethe_crypto::encrypt(content.as_bytes(), &key.public)?)
    }
}
