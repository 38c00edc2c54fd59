//! Contract tests for the redb-backed repository.
//!
//! Mirrors the in-memory repository's semantics and adds what only a
//! durable backend can show: state surviving a close and reopen.

use chrono::{Duration, Utc};
use lethe_core::{
    Clock, CreateOutcome, KeyRepository, KeyStore, KeyStoreError, ManualClock, PlainProtection,
};
use lethe_server::RedbRepository;
use tempfile::TempDir;

fn open_repo(dir: &TempDir) -> RedbRepository {
    RedbRepository::open(dir.path().join("keys.redb")).unwrap()
}

#[test]
fn create_then_get_roundtrips() {
    let dir = TempDir::new().unwrap();
    let repo = open_repo(&dir);
    let expiration = Utc::now() + Duration::hours(1);

    assert_eq!(repo.create("k1", expiration, "protected").unwrap(), CreateOutcome::Created);

    let record = repo.get_active("k1").unwrap().unwrap();
    assert_eq!(record.expiration, expiration);
    assert_eq!(record.protected_key, "protected");
}

#[test]
fn duplicate_create_leaves_original_untouched() {
    let dir = TempDir::new().unwrap();
    let repo = open_repo(&dir);
    let expiration = Utc::now() + Duration::hours(1);

    repo.create("k1", expiration, "first").unwrap();
    assert_eq!(
        repo.create("k1", expiration, "second").unwrap(),
        CreateOutcome::Duplicate
    );
    assert_eq!(repo.get_active("k1").unwrap().unwrap().protected_key, "first");
}

#[test]
fn retire_moves_row_and_reserves_the_id() {
    let dir = TempDir::new().unwrap();
    let repo = open_repo(&dir);
    let expiration = Utc::now() - Duration::minutes(5);

    repo.create("k1", expiration, "protected").unwrap();
    repo.retire("k1", expiration).unwrap();

    assert!(repo.get_active("k1").unwrap().is_none());
    assert_eq!(repo.get_recently_expired("k1").unwrap(), Some(expiration));

    // The id stays taken even after the key material is gone.
    assert_eq!(
        repo.create("k1", Utc::now() + Duration::hours(1), "new").unwrap(),
        CreateOutcome::Duplicate
    );
}

#[test]
fn retire_of_missing_row_is_a_noop() {
    let dir = TempDir::new().unwrap();
    let repo = open_repo(&dir);

    repo.retire("ghost", Utc::now()).unwrap();
    assert!(repo.get_recently_expired("ghost").unwrap().is_none());
}

#[test]
fn purge_removes_stale_rows_from_both_tables() {
    let dir = TempDir::new().unwrap();
    let repo = open_repo(&dir);
    let now = Utc::now();

    repo.create("stale-active", now - Duration::hours(48), "a").unwrap();
    repo.create("live-active", now + Duration::hours(1), "b").unwrap();
    repo.create("stale-retired", now - Duration::hours(48), "c").unwrap();
    repo.retire("stale-retired", now - Duration::hours(48)).unwrap();

    let stats = repo.purge_expired_before(now - Duration::hours(24)).unwrap();
    assert_eq!(stats.active, 1);
    assert_eq!(stats.recently_expired, 1);

    assert!(repo.get_active("stale-active").unwrap().is_none());
    assert!(repo.get_active("live-active").unwrap().is_some());
    assert!(repo.get_recently_expired("stale-retired").unwrap().is_none());

    // Idempotent on a rerun.
    let stats = repo.purge_expired_before(now - Duration::hours(24)).unwrap();
    assert_eq!(stats.active + stats.recently_expired, 0);
}

#[test]
fn state_survives_close_and_reopen() {
    let dir = TempDir::new().unwrap();
    let expiration = Utc::now() + Duration::hours(1);

    {
        let repo = open_repo(&dir);
        repo.create("durable", expiration, "protected").unwrap();
    }

    let repo = open_repo(&dir);
    let record = repo.get_active("durable").unwrap().unwrap();
    assert_eq!(record.expiration, expiration);
    assert_eq!(record.protected_key, "protected");
}

#[test]
fn lifecycle_store_runs_the_full_state_machine_over_redb() {
    let dir = TempDir::new().unwrap();
    let clock = ManualClock::new(Utc::now());
    let store = KeyStore::new(open_repo(&dir), PlainProtection, clock.clone(), Duration::hours(24));

    let key = lethe_core::BroadcastKey {
        key_id: "11111111-2222-3333-4444-555555555555".to_string(),
        expiration: clock.now() + Duration::minutes(10),
        public: lethe_crypto::PublicKey {
            n: lethe_crypto::BigUint::from(3233u32),
            e: lethe_crypto::BigUint::from(65_537u32),
        },
    };
    store.store(&key).unwrap();
    assert_eq!(store.get(&key.key_id).unwrap().public, key.public);

    // Lazy expiry inside the grace window.
    clock.advance(Duration::minutes(30));
    assert!(matches!(
        store.get(&key.key_id),
        Err(KeyStoreError::Expired { expiration, .. }) if expiration == key.expiration
    ));

    // Past the grace window the sweep forgets it entirely.
    clock.advance(Duration::hours(24));
    store.sweep().unwrap();
    assert!(matches!(store.get(&key.key_id), Err(KeyStoreError::NotFound { .. })));
}
