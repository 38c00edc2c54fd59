//! Fuzz target for the escape codec round trip.
//!
//! For every input, escape then unescape-and-strip must return the original
//! bytes exactly. A mismatch means data corruption in the decrypt path.

#![no_main]

use lethe_crypto::escape::{escape, unescape_and_strip};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let escaped = escape(data);
    let recovered = unescape_and_strip(&escaped);
    assert_eq!(recovered, data, "escape/strip round trip lost data");
});
