//! In-memory repository for tests and development.

#![allow(clippy::expect_used, reason = "Mutex poisoning should cause a panic")]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::repository::{
    ActiveKeyRecord, CreateOutcome, KeyRepository, PurgeStats, RepositoryError,
};

/// Repository backed by two in-process hash maps.
///
/// Thread-safe via a single mutex, which also provides the per-key-id
/// atomicity the trait requires. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    inner: Arc<Mutex<Tables>>,
}

#[derive(Debug, Default)]
struct Tables {
    active: HashMap<String, ActiveKeyRecord>,
    recently_expired: HashMap<String, DateTime<Utc>>,
}

impl MemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyRepository for MemoryRepository {
    fn create(
        &self,
        key_id: &str,
        expiration: DateTime<Utc>,
        protected_key: &str,
    ) -> Result<CreateOutcome, RepositoryError> {
        let mut tables = self.inner.lock().expect("MemoryRepository mutex poisoned");

        if tables.active.contains_key(key_id) || tables.recently_expired.contains_key(key_id) {
            return Ok(CreateOutcome::Duplicate);
        }

        tables.active.insert(
            key_id.to_string(),
            ActiveKeyRecord { expiration, protected_key: protected_key.to_string() },
        );
        Ok(CreateOutcome::Created)
    }

    fn get_active(&self, key_id: &str) -> Result<Option<ActiveKeyRecord>, RepositoryError> {
        let tables = self.inner.lock().expect("MemoryRepository mutex poisoned");
        Ok(tables.active.get(key_id).cloned())
    }

    fn retire(&self, key_id: &str, expiration: DateTime<Utc>) -> Result<(), RepositoryError> {
        let mut tables = self.inner.lock().expect("MemoryRepository mutex poisoned");

        if tables.active.remove(key_id).is_some() {
            tables.recently_expired.insert(key_id.to_string(), expiration);
        }
        Ok(())
    }

    fn delete_active(&self, key_id: &str) -> Result<(), RepositoryError> {
        let mut tables = self.inner.lock().expect("MemoryRepository mutex poisoned");
        tables.active.remove(key_id);
        Ok(())
    }

    fn get_recently_expired(
        &self,
        key_id: &str,
    ) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        let tables = self.inner.lock().expect("MemoryRepository mutex poisoned");
        Ok(tables.recently_expired.get(key_id).copied())
    }

    fn purge_expired_before(&self, cutoff: DateTime<Utc>) -> Result<PurgeStats, RepositoryError> {
        let mut tables = self.inner.lock().expect("MemoryRepository mutex poisoned");

        let before_active = tables.active.len();
        tables.active.retain(|_, record| record.expiration >= cutoff);
        let active = (before_active - tables.active.len()) as u64;

        let before_expired = tables.recently_expired.len();
        tables.recently_expired.retain(|_, expiration| *expiration >= cutoff);
        let recently_expired = (before_expired - tables.recently_expired.len()) as u64;

        Ok(PurgeStats { active, recently_expired })
    }
}
