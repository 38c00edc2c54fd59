//! Optional CLI configuration file.
//!
//! `{ "server_address": "..." }` in the user config directory, overridable
//! via `LETHE_CONFIG_PATH`. Missing file means no defaults; a present but
//! malformed file is an error rather than a silent fallback.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CliError;

const CONFIG_PATH_ENV: &str = "LETHE_CONFIG_PATH";
const CONFIG_FILE: &str = "config.json";

/// Persistent CLI defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Custodian base URL used when --server-address is not passed.
    pub server_address: String,
}

/// Resolve the config file path: env override, then the user config dir.
pub fn path() -> Option<PathBuf> {
    match env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => dirs::config_dir().map(|dir| dir.join("lethe").join(CONFIG_FILE)),
    }
}

/// Load the config when present; `None` when no file exists.
pub fn load() -> Result<Option<Config>, CliError> {
    let Some(path) = path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path)?;
    let config = serde_json::from_str(&content)
        .map_err(|e| CliError::InvalidConfig { path: path.clone(), reason: e.to_string() })?;

    tracing::debug!(path = %path.display(), "loaded config");
    Ok(Some(config))
}
