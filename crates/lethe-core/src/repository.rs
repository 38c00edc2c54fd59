//! Storage capability for the key lifecycle store.
//!
//! A repository owns two tables: active keys (id → expiration + protected
//! public half) and recently-expired markers (id → expiration only). The
//! lifecycle state machine in [`crate::keystore`] drives transitions; the
//! repository's job is to make each operation atomic per key id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Infrastructure errors from a repository backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Underlying storage failure (I/O, transaction, table access).
    #[error("storage: {0}")]
    Io(String),

    /// A stored record could not be encoded or decoded.
    #[error("storage serialization: {0}")]
    Serialization(String),
}

/// Whether [`KeyRepository::create`] inserted the row or found it taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The key id was free and the record was inserted.
    Created,
    /// The key id already exists in either table; nothing was written.
    Duplicate,
}

/// An active key row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveKeyRecord {
    /// When the key stops working.
    pub expiration: DateTime<Utc>,
    /// At-rest-protected serialized public half.
    pub protected_key: String,
}

/// Rows removed by a purge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeStats {
    /// Active rows whose expiration fell before the cutoff.
    pub active: u64,
    /// Recently-expired markers whose expiration fell before the cutoff.
    pub recently_expired: u64,
}

/// Two-table storage backend for the key lifecycle.
///
/// Implementations are cheap cloneable handles onto shared state: clones see
/// the same rows. `create` and `retire` must be atomic with respect to
/// concurrent calls on the same key id.
pub trait KeyRepository: Clone + Send + Sync + 'static {
    /// Insert a fresh active row. Returns [`CreateOutcome::Duplicate`]
    /// without writing when the id exists in either table.
    fn create(
        &self,
        key_id: &str,
        expiration: DateTime<Utc>,
        protected_key: &str,
    ) -> Result<CreateOutcome, RepositoryError>;

    /// Read an active row.
    fn get_active(&self, key_id: &str) -> Result<Option<ActiveKeyRecord>, RepositoryError>;

    /// Atomically move an active row to the recently-expired table, dropping
    /// its key material. Idempotent: a concurrent loser finds the row gone
    /// and the marker present, which is the same observable state.
    fn retire(&self, key_id: &str, expiration: DateTime<Utc>) -> Result<(), RepositoryError>;

    /// Delete an active row outright (used when a record is found expired
    /// beyond the grace window). Idempotent.
    fn delete_active(&self, key_id: &str) -> Result<(), RepositoryError>;

    /// Read a recently-expired marker's expiration.
    fn get_recently_expired(
        &self,
        key_id: &str,
    ) -> Result<Option<DateTime<Utc>>, RepositoryError>;

    /// Delete every row in both tables with `expiration < cutoff`.
    /// Idempotent; safe on a timer.
    fn purge_expired_before(&self, cutoff: DateTime<Utc>) -> Result<PurgeStats, RepositoryError>;
}
