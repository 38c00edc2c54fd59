//! Lethe client protocol.
//!
//! The client side of the split-key scheme: derive the pre-custodian hash
//! from the password, have the custodian encrypt it under a per-file RSA
//! key, verify the custodian's honesty with the private half, assemble the
//! 32-byte content key, and seal or open the file body.
//!
//! # Flows
//!
//! [`seal_file`] runs the create flow: new key → honesty check → content
//! key → AEAD seal → artifact. [`open_file`] runs the reuse flow: local
//! expiry check → deterministic re-encryption → honesty check → content key
//! → AEAD open. Both are sequential, blocking, and free of retries; a
//! transport failure surfaces to the caller.
//!
//! The custodian itself sits behind the [`Custodian`] trait so the protocol
//! can run against HTTP ([`HttpCustodian`]) or an in-process implementation
//! in tests.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod custodian;
mod flows;
mod keying;

pub use custodian::{Custodian, CustodianError, ENCRYPT_ROUTE, HttpCustodian, NEW_KEY_ROUTE};
pub use flows::{VaultError, open_file, seal_file};
pub use keying::{derive_content_key, pre_custodian_hash};
