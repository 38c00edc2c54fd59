//! Key lifecycle state machine.
//!
//! This is the enforcement point for forgetting: once a key's public half
//! leaves the active table, the custodian can never again reproduce the
//! ciphertext a content key depends on. Expiry is applied lazily on `get`
//! and proactively by `sweep`; callers cannot tell the two apart.

use chrono::{DateTime, Duration, Utc};
use lethe_crypto::{KeyError, PublicKey, deserialize_public_key, serialize_public_key};
use thiserror::Error;

use crate::clock::Clock;
use crate::protection::{DataProtection, ProtectionError};
use crate::repository::{CreateOutcome, KeyRepository, PurgeStats, RepositoryError};

/// Default grace window, in hours, during which an expired key still
/// answers "expired at T" instead of "not found".
pub const DEFAULT_GRACE_HOURS: i64 = 24;

/// A custodian-held key: id, expiration, and the public half.
#[derive(Debug, Clone)]
pub struct BroadcastKey {
    /// Unique identifier clients reference the key by.
    pub key_id: String,
    /// When the key stops working.
    pub expiration: DateTime<Utc>,
    /// Public half used for deterministic re-encryption.
    pub public: PublicKey,
}

/// Errors from the lifecycle store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyStoreError {
    /// The key id is unknown: never created, or already purged.
    #[error("key not found: {key_id}")]
    NotFound {
        /// Requested key id.
        key_id: String,
    },

    /// The key expired and is within the grace window.
    #[error("key {key_id} expired at {expiration}")]
    Expired {
        /// Requested key id.
        key_id: String,
        /// The original expiration, not the time of the lookup.
        expiration: DateTime<Utc>,
    },

    /// A key with this id already exists.
    #[error("key with id {key_id} already exists")]
    Duplicate {
        /// Offending key id.
        key_id: String,
    },

    /// Repository failure.
    #[error(transparent)]
    Storage(#[from] RepositoryError),

    /// At-rest protection failure.
    #[error(transparent)]
    Protection(#[from] ProtectionError),

    /// A stored public half failed to deserialize.
    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Lifecycle store over injected storage, protection, and clock.
#[derive(Debug, Clone)]
pub struct KeyStore<R, P, C> {
    repo: R,
    protection: P,
    clock: C,
    grace: Duration,
}

impl<R: KeyRepository, P: DataProtection, C: Clock> KeyStore<R, P, C> {
    /// Create a store with the given grace window.
    pub fn new(repo: R, protection: P, clock: C, grace: Duration) -> Self {
        Self { repo, protection, clock, grace }
    }

    /// Insert a new key. Fails with [`KeyStoreError::Duplicate`] when the id
    /// is already taken; ids carry enough entropy that this is never a
    /// normal case.
    pub fn store(&self, key: &BroadcastKey) -> Result<(), KeyStoreError> {
        let serialized = serialize_public_key(&key.public);
        let protected = self.protection.protect(&serialized)?;

        match self.repo.create(&key.key_id, key.expiration, &protected)? {
            CreateOutcome::Created => Ok(()),
            CreateOutcome::Duplicate => {
                Err(KeyStoreError::Duplicate { key_id: key.key_id.clone() })
            },
        }
    }

    /// Look up a key for re-encryption, applying lazy expiry.
    ///
    /// - Active and unexpired: the public half is unprotected and returned.
    /// - Active but expired within grace: the row is retired (key material
    ///   dropped) and [`KeyStoreError::Expired`] carries the original
    ///   expiration.
    /// - Active but expired beyond grace: the row is deleted and reported
    ///   [`KeyStoreError::NotFound`], indistinguishable from a swept key.
    /// - Recently expired: [`KeyStoreError::Expired`] without resurrection.
    /// - Otherwise: [`KeyStoreError::NotFound`].
    pub fn get(&self, key_id: &str) -> Result<BroadcastKey, KeyStoreError> {
        if let Some(record) = self.repo.get_active(key_id)? {
            let now = self.clock.now();

            if record.expiration >= now {
                let serialized = self.protection.unprotect(&record.protected_key)?;
                let public = deserialize_public_key(&serialized)?;
                return Ok(BroadcastKey {
                    key_id: key_id.to_string(),
                    expiration: record.expiration,
                    public,
                });
            }

            if record.expiration < now - self.grace {
                self.repo.delete_active(key_id)?;
                return Err(KeyStoreError::NotFound { key_id: key_id.to_string() });
            }

            // A concurrent get may have retired the row already; the
            // repository makes the move idempotent, so both callers observe
            // the same expired outcome.
            self.repo.retire(key_id, record.expiration)?;
            return Err(KeyStoreError::Expired {
                key_id: key_id.to_string(),
                expiration: record.expiration,
            });
        }

        if let Some(expiration) = self.repo.get_recently_expired(key_id)? {
            return Err(KeyStoreError::Expired { key_id: key_id.to_string(), expiration });
        }

        Err(KeyStoreError::NotFound { key_id: key_id.to_string() })
    }

    /// Purge everything expired for longer than the grace window, including
    /// active rows that were never read again after expiring.
    pub fn sweep(&self) -> Result<PurgeStats, KeyStoreError> {
        let cutoff = self.clock.now() - self.grace;
        Ok(self.repo.purge_expired_before(cutoff)?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use lethe_crypto::{BigUint, PublicKey};

    use super::{BroadcastKey, DEFAULT_GRACE_HOURS, KeyStore, KeyStoreError};
    use crate::clock::{Clock, ManualClock};
    use crate::memory::MemoryRepository;
    use crate::protection::PlainProtection;
    use crate::repository::KeyRepository;

    fn grace() -> Duration {
        Duration::hours(DEFAULT_GRACE_HOURS)
    }

    fn store_with_clock() -> (KeyStore<MemoryRepository, PlainProtection, ManualClock>, ManualClock)
    {
        let clock = ManualClock::new(Utc::now());
        let store =
            KeyStore::new(MemoryRepository::new(), PlainProtection, clock.clone(), grace());
        (store, clock)
    }

    // The store never checks key strength, so a small modulus keeps these
    // tests fast.
    fn sample_key(key_id: &str, expiration: chrono::DateTime<Utc>) -> BroadcastKey {
        BroadcastKey {
            key_id: key_id.to_string(),
            expiration,
            public: PublicKey { n: BigUint::from(3233u32), e: BigUint::from(65_537u32) },
        }
    }

    #[test]
    fn store_then_get_returns_active_key() {
        let (store, clock) = store_with_clock();
        let key = sample_key("k1", clock.now() + Duration::hours(1));

        store.store(&key).unwrap();
        let fetched = store.get("k1").unwrap();

        assert_eq!(fetched.key_id, "k1");
        assert_eq!(fetched.expiration, key.expiration);
        assert_eq!(fetched.public, key.public);
    }

    #[test]
    fn duplicate_store_fails() {
        let (store, clock) = store_with_clock();
        let key = sample_key("k1", clock.now() + Duration::hours(1));

        store.store(&key).unwrap();
        assert!(matches!(
            store.store(&key),
            Err(KeyStoreError::Duplicate { key_id }) if key_id == "k1"
        ));
    }

    #[test]
    fn expired_within_grace_reports_original_expiration() {
        let (store, clock) = store_with_clock();
        let expiration = clock.now() + Duration::hours(1);
        store.store(&sample_key("k1", expiration)).unwrap();

        clock.advance(Duration::hours(2));

        let err = store.get("k1").unwrap_err();
        assert!(matches!(
            err,
            KeyStoreError::Expired { expiration: at, .. } if at == expiration
        ));
    }

    #[test]
    fn expired_key_stays_expired_on_repeat_lookups() {
        let (store, clock) = store_with_clock();
        let expiration = clock.now() + Duration::minutes(10);
        store.store(&sample_key("k1", expiration)).unwrap();

        clock.advance(Duration::minutes(30));

        for _ in 0..3 {
            assert!(matches!(store.get("k1"), Err(KeyStoreError::Expired { .. })));
        }
    }

    #[test]
    fn expired_beyond_grace_becomes_not_found() {
        let (store, clock) = store_with_clock();
        store.store(&sample_key("k1", clock.now() + Duration::hours(1))).unwrap();

        clock.advance(Duration::hours(1) + grace() + Duration::seconds(1));

        assert!(matches!(store.get("k1"), Err(KeyStoreError::NotFound { .. })));
        // And it stays gone.
        assert!(matches!(store.get("k1"), Err(KeyStoreError::NotFound { .. })));
    }

    #[test]
    fn unknown_key_not_found() {
        let (store, _) = store_with_clock();
        assert!(matches!(store.get("missing"), Err(KeyStoreError::NotFound { .. })));
    }

    #[test]
    fn sweep_purges_retired_rows_after_grace() {
        let (store, clock) = store_with_clock();
        let expiration = clock.now() + Duration::minutes(10);
        store.store(&sample_key("k1", expiration)).unwrap();

        // Lazy-retire via a lookup, then cross the grace boundary.
        clock.advance(Duration::minutes(30));
        assert!(matches!(store.get("k1"), Err(KeyStoreError::Expired { .. })));

        clock.advance(grace());
        let stats = store.sweep().unwrap();
        assert_eq!(stats.recently_expired, 1);

        assert!(matches!(store.get("k1"), Err(KeyStoreError::NotFound { .. })));
    }

    #[test]
    fn sweep_purges_never_read_active_rows() {
        let (store, clock) = store_with_clock();
        store.store(&sample_key("unread", clock.now() + Duration::minutes(10))).unwrap();

        clock.advance(Duration::minutes(10) + grace() + Duration::minutes(1));

        let stats = store.sweep().unwrap();
        assert_eq!(stats.active, 1);
        assert!(matches!(store.get("unread"), Err(KeyStoreError::NotFound { .. })));
    }

    #[test]
    fn swept_and_lazily_expired_are_indistinguishable() {
        let (store, clock) = store_with_clock();
        let expiration = clock.now() + Duration::minutes(10);
        store.store(&sample_key("lazy", expiration)).unwrap();
        store.store(&sample_key("swept", expiration)).unwrap();

        clock.advance(Duration::minutes(30));

        // "lazy" is retired by a lookup; "swept" by an explicit pass at the
        // same logical point. Both must answer identically afterwards.
        let lazy_err = store.get("lazy").unwrap_err();
        store.repo.retire("swept", expiration).unwrap();
        let swept_err = store.get("swept").unwrap_err();

        match (lazy_err, swept_err) {
            (
                KeyStoreError::Expired { expiration: a, .. },
                KeyStoreError::Expired { expiration: b, .. },
            ) => assert_eq!(a, b),
            other => unreachable!("expected two expired errors, got {other:?}"),
        }
    }
}
