//! Background purge loop.
//!
//! Keys that expire and are never looked up again must still be forgotten;
//! this task sweeps both tables on a fixed period. The sweep itself is
//! idempotent, so overlapping or repeated runs are harmless.

use std::time::Duration;

use lethe_core::{Clock, DataProtection, KeyRepository, KeyStore};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Spawn the sweeper, returning its task handle.
pub fn spawn<R, P, C>(key_store: KeyStore<R, P, C>, period: Duration) -> JoinHandle<()>
where
    R: KeyRepository,
    P: DataProtection,
    C: Clock,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let store = key_store.clone();
            match tokio::task::spawn_blocking(move || store.sweep()).await {
                Ok(Ok(stats)) if stats.active + stats.recently_expired > 0 => {
                    tracing::info!(
                        active = stats.active,
                        recently_expired = stats.recently_expired,
                        "sweep purged expired keys"
                    );
                },
                Ok(Ok(_)) => tracing::debug!("sweep found nothing to purge"),
                Ok(Err(e)) => tracing::error!(error = %e, "sweep failed"),
                Err(e) => tracing::error!(error = %e, "sweep task failed"),
            }
        }
    })
}
