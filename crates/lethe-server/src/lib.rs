//! Lethe custodian server.
//!
//! Production glue around [`lethe_core`]: an axum HTTP surface over the
//! encryptor service, a redb-backed repository for the key lifecycle, an
//! AEAD at-rest protection for stored public halves, and a periodic sweeper
//! that purges keys past their grace window.
//!
//! # Components
//!
//! - [`api::router`]: the two-route HTTP surface (`/new-key`, `/encrypt`)
//! - [`RedbRepository`]: durable two-table storage with per-key atomicity
//! - [`AeadProtection`]: ChaCha20-Poly1305 protect/unprotect capability
//! - [`sweeper::spawn`]: background purge loop

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod api;
pub mod protection;
pub mod storage;
pub mod sweeper;

pub use api::{ApiError, router};
pub use protection::AeadProtection;
pub use storage::RedbRepository;
