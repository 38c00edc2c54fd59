//! Metadata embedded in encrypted artifacts.
//!
//! [`FileMetadata`] is the only record of how to reconstruct a file's
//! content key; it is written once at encrypt time and never modified.
//! [`AlgVersion`] tags the four algorithm choices independently so future
//! changes stay self-describing.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const VERSION_SEPARATOR: char = ':';

/// The four independently versioned algorithm choices of an artifact:
/// symmetric cipher, local hash, pre-custodian hash, post-custodian hash.
///
/// Serialized colon-joined (`"1:1:1:1"`). Missing trailing segments parse as
/// empty, meaning "this build's default"; unknown values are rejected where
/// the component is actually used, not here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlgVersion {
    /// Symmetric cipher version tag.
    pub symmetric: String,
    /// Local-half hash version tag.
    pub local_hash: String,
    /// Pre-custodian hash version tag.
    pub pre_remote_hash: String,
    /// Post-custodian hash version tag.
    pub post_remote_hash: String,
}

impl AlgVersion {
    /// The version written into newly encrypted artifacts.
    pub fn current() -> Self {
        Self {
            symmetric: "1".to_string(),
            local_hash: "1".to_string(),
            pre_remote_hash: "1".to_string(),
            post_remote_hash: "1".to_string(),
        }
    }

    /// Parse a colon-joined tag string. Never fails: absent segments are
    /// empty, surplus segments are ignored.
    pub fn parse(s: &str) -> Self {
        let mut parts = s.split(VERSION_SEPARATOR);
        let mut next = || parts.next().unwrap_or("").to_string();
        Self {
            symmetric: next(),
            local_hash: next(),
            pre_remote_hash: next(),
            post_remote_hash: next(),
        }
    }
}

impl fmt::Display for AlgVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}",
            self.symmetric,
            self.local_hash,
            self.pre_remote_hash,
            self.post_remote_hash,
            sep = VERSION_SEPARATOR
        )
    }
}

/// Immutable record of how an artifact's content key can be reconstructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Identifier of the custodian-held key.
    pub key_id: String,
    /// When the custodian stops re-encrypting for this key.
    pub expiration: DateTime<Utc>,
    /// Serialized private half of the per-file key pair.
    pub verification_key: String,
    /// Base URL of the custodian that holds the public half.
    pub server_address: String,
    /// Colon-joined [`AlgVersion`] tags.
    pub alg_version: String,
}

impl FileMetadata {
    /// The parsed algorithm version tags.
    pub fn alg_version(&self) -> AlgVersion {
        AlgVersion::parse(&self.alg_version)
    }

    /// Human-readable summary for display, relative to `now`.
    pub fn describe(&self, body_len: usize, now: DateTime<Utc>) -> String {
        let remaining = self.expiration.signed_duration_since(now);
        let remaining = if remaining.num_seconds() >= 0 {
            format!("in {}", format_duration(remaining))
        } else {
            format!("{} ago", format_duration(-remaining))
        };

        format!(
            "Encrypted content length: {body_len} bytes\n\
             Key ID:                   {}\n\
             Expires at:               {} ({remaining})\n\
             Server Address:           {}\n\
             Algorithm Version:        {}\n",
            self.key_id,
            self.expiration.to_rfc3339(),
            self.server_address,
            self.alg_version,
        )
    }
}

fn format_duration(d: chrono::Duration) -> String {
    let secs = d.num_seconds();
    if secs >= 86_400 {
        format!("{}d{}h", secs / 86_400, (secs % 86_400) / 3600)
    } else if secs >= 3600 {
        format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}
