//! Artifact and plain-file I/O with overwrite protection.

use std::fs;
use std::path::Path;

use lethe_proto::Artifact;

use crate::error::CliError;

/// Suffix appended to encrypted output files.
pub const ARTIFACT_SUFFIX: &str = ".lethe";

/// Write bytes, refusing to clobber an existing file unless asked.
pub fn write_file(path: &Path, overwrite: bool, data: &[u8]) -> Result<(), CliError> {
    if path.exists() && !overwrite {
        return Err(CliError::OutputExists { path: path.to_path_buf() });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    Ok(fs::write(path, data)?)
}

/// Read and decode an encrypted artifact.
pub fn read_artifact(path: &Path) -> Result<Artifact, CliError> {
    if !path.exists() {
        return Err(CliError::InputMissing { path: path.to_path_buf() });
    }

    Ok(Artifact::from_bytes(&fs::read(path)?)?)
}

/// Encode and write an artifact.
pub fn write_artifact(path: &Path, overwrite: bool, artifact: &Artifact) -> Result<(), CliError> {
    write_file(path, overwrite, &artifact.to_bytes()?)
}
