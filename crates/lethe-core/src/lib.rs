//! Lethe custodian core.
//!
//! Pure domain logic for the custodian service: the key lifecycle state
//! machine that actually enforces expiration, and the encryptor service
//! behind the HTTP surface. No I/O happens here — time, storage, and at-rest
//! protection are capabilities injected through traits, so the logic runs
//! identically against production backends and test doubles.
//!
//! # Lifecycle
//!
//! ```text
//!          store                    get after expiration        sweep/get
//! (none) ────────▶ Active ──────────────────────────▶ RecentlyExpired ──▶ Purged
//!                     │                                      │
//!                     │ get before expiration                │ get
//!                     ▼                                      ▼
//!                public half                          "expired at T"
//! ```
//!
//! A `RecentlyExpired` row holds only the key id and expiration — the public
//! half is deleted the moment the record leaves `Active`, so the grace
//! window changes error reporting, never recoverability.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod clock;
pub mod encryptor;
pub mod keystore;
pub mod memory;
pub mod protection;
pub mod repository;

pub use clock::{Clock, ManualClock, SystemClock};
pub use encryptor::{Encryptor, EncryptorError, NewKeyResult};
pub use keystore::{BroadcastKey, DEFAULT_GRACE_HOURS, KeyStore, KeyStoreError};
pub use memory::MemoryRepository;
pub use protection::{DataProtection, PlainProtection, ProtectionError};
pub use repository::{
    ActiveKeyRecord, CreateOutcome, KeyRepository, PurgeStats, RepositoryError,
};
