//! Redb-backed durable repository.
//!
//! Two tables keyed by key id: `active_keys` (CBOR [`ActiveKeyRecord`]) and
//! `recently_expired` (CBOR expiration timestamp). Every mutation runs in a
//! single write transaction, which is what gives `create` and `retire` their
//! per-key-id atomicity; redb serializes write transactions, so a concurrent
//! retire loser simply finds the row already moved.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lethe_core::{ActiveKeyRecord, CreateOutcome, KeyRepository, PurgeStats, RepositoryError};
use redb::{Database, ReadableTable, TableDefinition};

/// Table: active keys.
/// Key: key id. Value: CBOR-encoded `ActiveKeyRecord`.
const ACTIVE_KEYS: TableDefinition<&str, &[u8]> = TableDefinition::new("active_keys");

/// Table: recently-expired markers.
/// Key: key id. Value: CBOR-encoded expiration timestamp. Never key material.
const RECENTLY_EXPIRED: TableDefinition<&str, &[u8]> = TableDefinition::new("recently_expired");

/// Durable repository backed by redb.
///
/// Thread-safe through redb's internal locking. Clone is cheap (Arc).
#[derive(Clone)]
pub struct RedbRepository {
    db: Arc<Database>,
}

impl RedbRepository {
    /// Open or create a redb database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let db = Database::create(path.as_ref()).map_err(io_err)?;

        let txn = db.begin_write().map_err(io_err)?;
        {
            let _ = txn.open_table(ACTIVE_KEYS).map_err(io_err)?;
            let _ = txn.open_table(RECENTLY_EXPIRED).map_err(io_err)?;
        }
        txn.commit().map_err(io_err)?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl KeyRepository for RedbRepository {
    fn create(
        &self,
        key_id: &str,
        expiration: DateTime<Utc>,
        protected_key: &str,
    ) -> Result<CreateOutcome, RepositoryError> {
        let txn = self.db.begin_write().map_err(io_err)?;

        let outcome = {
            let mut active = txn.open_table(ACTIVE_KEYS).map_err(io_err)?;
            let expired = txn.open_table(RECENTLY_EXPIRED).map_err(io_err)?;

            let taken = active.get(key_id).map_err(io_err)?.is_some()
                || expired.get(key_id).map_err(io_err)?.is_some();

            if taken {
                CreateOutcome::Duplicate
            } else {
                let record =
                    ActiveKeyRecord { expiration, protected_key: protected_key.to_string() };
                let bytes = encode(&record)?;
                active.insert(key_id, bytes.as_slice()).map_err(io_err)?;
                CreateOutcome::Created
            }
        };

        txn.commit().map_err(io_err)?;
        Ok(outcome)
    }

    fn get_active(&self, key_id: &str) -> Result<Option<ActiveKeyRecord>, RepositoryError> {
        let txn = self.db.begin_read().map_err(io_err)?;
        let active = txn.open_table(ACTIVE_KEYS).map_err(io_err)?;

        match active.get(key_id).map_err(io_err)? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    fn retire(&self, key_id: &str, expiration: DateTime<Utc>) -> Result<(), RepositoryError> {
        let txn = self.db.begin_write().map_err(io_err)?;

        {
            let mut active = txn.open_table(ACTIVE_KEYS).map_err(io_err)?;
            let removed = active.remove(key_id).map_err(io_err)?.is_some();

            if removed {
                let mut expired = txn.open_table(RECENTLY_EXPIRED).map_err(io_err)?;
                let bytes = encode(&expiration)?;
                expired.insert(key_id, bytes.as_slice()).map_err(io_err)?;
            }
        }

        txn.commit().map_err(io_err)?;
        Ok(())
    }

    fn delete_active(&self, key_id: &str) -> Result<(), RepositoryError> {
        let txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut active = txn.open_table(ACTIVE_KEYS).map_err(io_err)?;
            active.remove(key_id).map_err(io_err)?;
        }
        txn.commit().map_err(io_err)?;
        Ok(())
    }

    fn get_recently_expired(
        &self,
        key_id: &str,
    ) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        let txn = self.db.begin_read().map_err(io_err)?;
        let expired = txn.open_table(RECENTLY_EXPIRED).map_err(io_err)?;

        match expired.get(key_id).map_err(io_err)? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    fn purge_expired_before(&self, cutoff: DateTime<Utc>) -> Result<PurgeStats, RepositoryError> {
        let txn = self.db.begin_write().map_err(io_err)?;

        let stats = {
            let mut active = txn.open_table(ACTIVE_KEYS).map_err(io_err)?;
            let mut expired = txn.open_table(RECENTLY_EXPIRED).map_err(io_err)?;

            let stale_active = collect_stale(&active, cutoff, |record: &ActiveKeyRecord| {
                record.expiration
            })?;
            for key_id in &stale_active {
                active.remove(key_id.as_str()).map_err(io_err)?;
            }

            let stale_expired =
                collect_stale(&expired, cutoff, |expiration: &DateTime<Utc>| *expiration)?;
            for key_id in &stale_expired {
                expired.remove(key_id.as_str()).map_err(io_err)?;
            }

            PurgeStats {
                active: stale_active.len() as u64,
                recently_expired: stale_expired.len() as u64,
            }
        };

        txn.commit().map_err(io_err)?;
        Ok(stats)
    }
}

/// Collect the key ids of rows whose expiration falls before the cutoff.
fn collect_stale<V, T>(
    table: &T,
    cutoff: DateTime<Utc>,
    expiration_of: impl Fn(&V) -> DateTime<Utc>,
) -> Result<Vec<String>, RepositoryError>
where
    V: serde::de::DeserializeOwned,
    T: ReadableTable<&'static str, &'static [u8]>,
{
    let mut stale = Vec::new();

    for entry in table.iter().map_err(io_err)? {
        let (key, value) = entry.map_err(io_err)?;
        let record: V = decode(value.value())?;
        if expiration_of(&record) < cutoff {
            stale.push(key.value().to_string());
        }
    }

    Ok(stale)
}

fn encode<V: serde::Serialize>(value: &V) -> Result<Vec<u8>, RepositoryError> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes)
        .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
    Ok(bytes)
}

fn decode<V: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<V, RepositoryError> {
    ciborium::from_reader(bytes).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

fn io_err(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Io(e.to_string())
}
