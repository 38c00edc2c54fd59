//! Lethe custodian server binary.
//!
//! # Usage
//!
//! ```bash
//! # Development: ephemeral at-rest key, local database
//! lethe-server --bind 127.0.0.1:8080
//!
//! # Production: durable at-rest key from the environment
//! LETHE_PROTECTION_KEY=$(head -c 32 /dev/urandom | base64) \
//!     lethe-server --bind 0.0.0.0:8080 --db-path /var/lib/lethe/keys.redb
//! ```

use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::Duration;
use clap::Parser;
use lethe_core::{DEFAULT_GRACE_HOURS, Encryptor, KeyStore, SystemClock};
use lethe_server::{AeadProtection, RedbRepository, router, sweeper};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Lethe custodian server
#[derive(Parser, Debug)]
#[command(name = "lethe-server")]
#[command(about = "Custodian service enforcing cryptographic expiration")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1:8080", env = "LETHE_BIND")]
    bind: String,

    /// Path to the key database
    #[arg(long, default_value = "lethe.redb", env = "LETHE_DB_PATH")]
    db_path: PathBuf,

    /// Base64-encoded 32-byte key protecting stored key material at rest
    #[arg(long, env = "LETHE_PROTECTION_KEY", hide_env_values = true)]
    protection_key: Option<String>,

    /// Hours an expired key keeps answering "expired" instead of "not found"
    #[arg(long, default_value_t = DEFAULT_GRACE_HOURS, env = "LETHE_GRACE_HOURS")]
    grace_hours: i64,

    /// Seconds between purge sweeps
    #[arg(long, default_value_t = 3600, env = "LETHE_SWEEP_INTERVAL_SECS")]
    sweep_interval_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("Lethe custodian starting");

    let protection = match &args.protection_key {
        Some(encoded) => AeadProtection::from_base64(encoded)?,
        None => {
            tracing::warn!("No at-rest protection key provided - using an ephemeral key");
            tracing::warn!("Stored keys will be unreadable after a restart!");
            AeadProtection::ephemeral()
        },
    };

    let repository = RedbRepository::open(&args.db_path)?;
    tracing::info!("Key database at {}", args.db_path.display());

    let key_store = KeyStore::new(
        repository,
        protection,
        SystemClock,
        Duration::hours(args.grace_hours),
    );

    sweeper::spawn(key_store.clone(), StdDuration::from_secs(args.sweep_interval_secs));
    tracing::info!(
        "Sweeper running every {}s with a {}h grace window",
        args.sweep_interval_secs,
        args.grace_hours
    );

    let app = router(Encryptor::new(key_store), SystemClock);

    let listener = tokio::net::TcpListener::bind(args.bind.as_str()).await?;
    tracing::info!("Custodian listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
