//! CLI error type.

use std::path::PathBuf;

use lethe_client::{CustodianError, VaultError};
use lethe_proto::ArtifactError;
use thiserror::Error;

/// Everything a subcommand can fail with.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("input file does not exist: '{}'", path.display())]
    InputMissing { path: PathBuf },

    #[error("output file already exists: '{}' (use --overwrite to replace it)", path.display())]
    OutputExists { path: PathBuf },

    #[error(
        "no custodian address: pass --server-address or set server_address in the config file"
    )]
    MissingServerAddress,

    #[error("password is required in non-interactive mode (flag or $LETHE_PASSWORD)")]
    MissingPassword,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("invalid choice '{choice}': enter 'p' to provide a password or 'g' to generate one")]
    InvalidChoice { choice: String },

    #[error(
        "invalid duration '{value}' (expected <number><unit> with unit one of y/mo/w/d/h/min/s)"
    )]
    InvalidDuration { value: String },

    #[error("config file '{}' is invalid: {reason}", path.display())]
    InvalidConfig { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Custodian(#[from] CustodianError),
}
