//! Lethe Cryptographic Primitives
//!
//! Building blocks for cryptographic forgetting: a deterministic chunked RSA
//! engine with custom exponent constraints, the escape/padding codec that
//! feeds it, the symmetric AEAD that seals file bodies, and the salted
//! truncated hashing that assembles the split content key.
//!
//! # Determinism
//!
//! The chunked RSA engine is intentionally deterministic: identical plaintext
//! and public half always produce identical ciphertext. The custodian's
//! re-encryption of a key hash must be byte-reproducible so that a client
//! holding the matching private half can verify it. This makes the scheme
//! unsuitable as a general-purpose public-key primitive; the only entropy in
//! a block is whatever the caller hashed into the plaintext beforehand.
//!
//! # Key hierarchy
//!
//! ```text
//! password ──SHA-256("local")───────────────▶ local half (16 bytes)
//! password ──SHA-256("before_encryption")──▶ pre-hash ──▶ custodian RSA
//!                                                              │
//! ciphertext ──SHA-256("remote")────────────▶ remote half (16 bytes)
//!                                                              │
//! local half ‖ remote half ────────────────▶ 32-byte content key ──▶ AEAD
//! ```
//!
//! Once the custodian purges the public half bound to a file's key id, the
//! remote half can never be recomputed and the content key is lost for good.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod aead;
pub mod chunked;
pub mod escape;
pub mod hash;
pub mod keygen;
pub mod keys;
pub mod serial;

pub use num_bigint_dig::BigUint;

pub use aead::{AeadError, open, seal};
pub use chunked::{RsaError, decrypt, encrypt};
pub use hash::{ContentKey, HashError, hash_to_size};
pub use keygen::generate;
pub use keys::{KeyError, KeyPair, PrivateKey, PublicKey};
pub use serial::{
    deserialize_private_key, deserialize_public_key, serialize_private_key, serialize_public_key,
};
