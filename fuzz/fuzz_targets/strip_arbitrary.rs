//! Fuzz target for the padding strip on arbitrary input.
//!
//! The strip runs over decrypted blocks, which may be garbage when the
//! ciphertext was corrupt or the wrong key was used. It must never panic,
//! whatever the bytes; malformed trailing escapes included.

#![no_main]

use lethe_crypto::escape::unescape_and_strip;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let stripped = unescape_and_strip(data);
    // Output can never be longer than the input.
    assert!(stripped.len() <= data.len());
});
