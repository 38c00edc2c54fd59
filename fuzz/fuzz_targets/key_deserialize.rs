//! Fuzz target for serialized key halves.
//!
//! Verification keys come out of file metadata that anyone can edit; both
//! deserializers must reject garbage without panicking.

#![no_main]

use lethe_crypto::{deserialize_private_key, deserialize_public_key};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = deserialize_public_key(s);
        let _ = deserialize_private_key(s);
    }
});
