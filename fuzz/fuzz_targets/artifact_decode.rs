//! Fuzz target for artifact framing.
//!
//! Arbitrary bytes must decode to an artifact or an error, never a panic:
//! encrypted files arrive from disk and may be truncated or corrupted.

#![no_main]

use lethe_proto::Artifact;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(artifact) = Artifact::from_bytes(data) {
        // Whatever decodes must re-encode.
        let _ = artifact.to_bytes();
    }
});
