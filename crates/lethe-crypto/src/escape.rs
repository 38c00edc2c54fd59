//! Escape codec protecting the block padding marker.
//!
//! RSA blocks are padded with [`PAD`] bytes, so literal occurrences of the
//! marker (and of the escape byte itself) inside plaintext must be made
//! unambiguous before blocks are packed. [`unescape_and_strip`] is the exact
//! left inverse of [`escape`] composed with padding removal: it runs once
//! over the concatenated decrypted blocks and recovers the original bytes.

/// Escape marker byte (`\`).
pub const ESCAPE: u8 = 0x5C;

/// Padding marker byte (`=`) used to fill RSA blocks.
pub const PAD: u8 = 0x3D;

/// Escape every literal [`ESCAPE`] and [`PAD`] byte.
///
/// `ESCAPE` becomes `ESCAPE,ESCAPE`; `PAD` becomes `ESCAPE,PAD`; everything
/// else passes through unchanged.
pub fn escape(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    for &byte in input {
        if byte == ESCAPE || byte == PAD {
            out.push(ESCAPE);
        }
        out.push(byte);
    }
    out
}

/// Undo [`escape`] and drop padding in a single left-to-right pass.
///
/// An `ESCAPE` yields the byte that follows it literally; a bare `PAD` is
/// padding and is dropped. A trailing unpaired `ESCAPE` never occurs in a
/// well-formed stream, but malformed input must not lose it or panic, so it
/// is kept as a literal.
pub fn unescape_and_strip(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        match input[i] {
            ESCAPE => {
                if let Some(&protected) = input.get(i + 1) {
                    out.push(protected);
                    i += 2;
                } else {
                    out.push(ESCAPE);
                    i += 1;
                }
            },
            PAD => i += 1,
            other => {
                out.push(other);
                i += 1;
            },
        }
    }

    out
}
