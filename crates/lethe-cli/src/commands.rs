//! Subcommand implementations.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use lethe_client::{HttpCustodian, open_file, seal_file};

use crate::error::CliError;
use crate::fileio::{self, ARTIFACT_SUFFIX};
use crate::{DecryptArgs, EncryptArgs, MetadataArgs, config, expiry, password};

pub fn encrypt(args: EncryptArgs) -> Result<(), CliError> {
    if !args.input.exists() {
        return Err(CliError::InputMissing { path: args.input.clone() });
    }

    let output = args.output.clone().unwrap_or_else(|| default_encrypt_output(&args.input));
    if output.exists() && !args.overwrite {
        return Err(CliError::OutputExists { path: output });
    }

    let server_address = resolve_server_address(args.server_address)?;
    let expiration = expiry::parse(&args.expires_in, Utc::now())?;
    let password = password::resolve_for_encrypt(args.password, args.non_interactive)?;

    tracing::debug!(input = %args.input.display(), "reading input file");
    let content = fs::read(&args.input)?;
    tracing::debug!(bytes = content.len(), "read input file");

    let custodian = HttpCustodian::new(&server_address)?;
    tracing::debug!(%server_address, %expiration, "requesting custodian key");
    let artifact = seal_file(&custodian, &password, expiration, &content)?;

    fileio::write_artifact(&output, args.overwrite, &artifact)?;

    println!("Output:         {} ({} bytes)", output.display(), artifact.body.len());
    println!("Key ID:         {}", artifact.metadata.key_id);
    println!(
        "Expires at:     {} (in {})",
        artifact.metadata.expiration.to_rfc3339(),
        args.expires_in
    );
    println!("Server Address: {}", artifact.metadata.server_address);

    Ok(())
}

pub fn decrypt(args: DecryptArgs) -> Result<(), CliError> {
    let artifact = fileio::read_artifact(&args.input)?;
    println!("{}", artifact.metadata.describe(artifact.body.len(), Utc::now()));

    let output = args.output.clone().unwrap_or_else(|| default_decrypt_output(&args.input));
    if output.exists() && !args.overwrite {
        return Err(CliError::OutputExists { path: output });
    }

    // The artifact remembers which custodian holds its key; a flag can
    // still point somewhere else (a mirror, a tunnel).
    let server_address = args
        .server_address
        .unwrap_or_else(|| artifact.metadata.server_address.clone());

    let password = password::resolve_for_decrypt(args.password, args.non_interactive)?;

    let custodian = HttpCustodian::new(&server_address)?;
    tracing::debug!(%server_address, key_id = %artifact.metadata.key_id, "reconstructing key");
    let content = open_file(&custodian, &artifact, &password, Utc::now())?;

    fileio::write_file(&output, args.overwrite, &content)?;

    println!("Decrypted to:   {} ({} bytes)", output.display(), content.len());

    Ok(())
}

pub fn metadata(args: &MetadataArgs) -> Result<(), CliError> {
    let artifact = fileio::read_artifact(&args.input)?;
    println!("{}", artifact.metadata.describe(artifact.body.len(), Utc::now()));
    Ok(())
}

fn resolve_server_address(flag: Option<String>) -> Result<String, CliError> {
    if let Some(address) = flag.filter(|a| !a.is_empty()) {
        return Ok(address);
    }

    match config::load()? {
        Some(config) => Ok(config.server_address),
        None => Err(CliError::MissingServerAddress),
    }
}

fn default_encrypt_output(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(ARTIFACT_SUFFIX);
    PathBuf::from(name)
}

fn default_decrypt_output(input: &Path) -> PathBuf {
    let as_str = input.to_string_lossy();
    match as_str.strip_suffix(ARTIFACT_SUFFIX) {
        Some(stripped) if !stripped.is_empty() => PathBuf::from(stripped),
        _ => {
            let mut name = input.as_os_str().to_os_string();
            name.push(".decrypted");
            PathBuf::from(name)
        },
    }
}
