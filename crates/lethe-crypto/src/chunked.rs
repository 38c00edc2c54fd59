//! Deterministic chunked RSA engine.
//!
//! Arbitrary-length plaintext is escaped, split into modulus-sized chunks,
//! and each chunk is encrypted with a plain modular exponentiation. No
//! randomness enters the padding: identical input and key always produce
//! identical ciphertext, which is what lets a client verify the custodian's
//! re-encryption byte for byte.
//!
//! # Block layout
//!
//! With `block_bytes = floor(bits(n)/8) − 1`, each plaintext block is a
//! `block_bytes` buffer filled with [`PAD`], with up to
//! `block_bytes − RESERVED_BYTES` escaped payload bytes at the front. The
//! buffer is read big-endian, so a block is always strictly below `n`. Each
//! ciphertext value is written into `ceil(bits(n)/8)` bytes — one byte wider
//! than a block, so decryption can restore the leading zero byte and drop it.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use num_bigint_dig::BigUint;
use thiserror::Error;

use crate::escape::{self, ESCAPE, PAD};
use crate::keys::{KeyError, PrivateKey, PublicKey};

/// Padding bytes at the tail of every block that never carry payload.
const RESERVED_BYTES: usize = 11;

/// Errors from the chunked RSA engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RsaError {
    /// The key half failed validation.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The modulus is too narrow to hold the reserved padding tail.
    #[error("modulus too small: {chunk_bytes}-byte chunks cannot hold {RESERVED_BYTES} reserved bytes")]
    ModulusTooSmall {
        /// Per-chunk ciphertext width derived from the modulus.
        chunk_bytes: usize,
    },

    /// The ciphertext is not a whole number of chunks.
    #[error("truncated ciphertext: {len} bytes is not a multiple of the {chunk_bytes}-byte chunk width")]
    TruncatedCiphertext {
        /// Decoded ciphertext length.
        len: usize,
        /// Expected per-chunk width.
        chunk_bytes: usize,
    },

    /// An encrypted value did not fit its fixed-width chunk buffer.
    #[error("ciphertext value needs {needed} bytes but the chunk width is {available}")]
    ValueOverflow {
        /// Bytes the value actually needs.
        needed: usize,
        /// Fixed chunk width.
        available: usize,
    },

    /// A decrypted value exceeded the plaintext block width: the ciphertext
    /// is corrupt or the key does not match.
    #[error("decrypted block out of range: wrong key or corrupted ciphertext")]
    BlockOutOfRange,

    /// The ciphertext was not valid base64.
    #[error("ciphertext is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Encrypt plaintext under the public half, returning base64 ciphertext.
///
/// Deterministic: no randomness is introduced by the padding.
pub fn encrypt(plaintext: &[u8], key: &PublicKey) -> Result<String, RsaError> {
    key.validate()?;

    let block_bytes = key.n.bits() / 8 - 1;
    let chunk_bytes = key.n.bits().div_ceil(8);
    let payload_bytes = block_bytes - RESERVED_BYTES;

    let escaped = escape::escape(plaintext);

    let mut out = Vec::new();
    for chunk in split_escaped(&escaped, payload_bytes) {
        let mut block = vec![PAD; block_bytes];
        block[..chunk.len()].copy_from_slice(chunk);

        let m = BigUint::from_bytes_be(&block);
        let c = m.modpow(&key.e, &key.n);
        out.extend_from_slice(&to_fixed_width(&c, chunk_bytes)?);
    }

    Ok(BASE64.encode(out))
}

/// Decrypt base64 ciphertext produced by [`encrypt`] with the private half.
pub fn decrypt(ciphertext: &str, key: &PrivateKey) -> Result<Vec<u8>, RsaError> {
    key.validate()?;
    let bytes = BASE64.decode(ciphertext)?;

    let chunk_bytes = key.n.bits().div_ceil(8);
    if chunk_bytes <= RESERVED_BYTES {
        return Err(RsaError::ModulusTooSmall { chunk_bytes });
    }
    if bytes.len() % chunk_bytes != 0 {
        return Err(RsaError::TruncatedCiphertext { len: bytes.len(), chunk_bytes });
    }

    // Same block width the encrypt side used; only equal to chunk_bytes - 1
    // when the modulus is byte-aligned, so derive it from the bit length.
    let block_bytes = key.n.bits() / 8 - 1;
    let mut padded = Vec::with_capacity(bytes.len() / chunk_bytes * block_bytes);

    for chunk in bytes.chunks_exact(chunk_bytes) {
        let c = BigUint::from_bytes_be(chunk);
        let m = c.modpow(&key.d, &key.n);

        if m.bits() > 8 * block_bytes {
            return Err(RsaError::BlockOutOfRange);
        }

        // The value occupies at most block_bytes, so the widened buffer's
        // first byte is always zero; drop it to recover the padded block.
        let widened = to_fixed_width(&m, block_bytes + 1)?;
        padded.extend_from_slice(&widened[1..]);
    }

    Ok(escape::unescape_and_strip(&padded))
}

/// Split an escaped stream into chunks of at most `max_len` bytes.
///
/// A chunk never ends between an escape marker and the byte it protects:
/// the strip on the decrypt side runs over the concatenation of all padded
/// blocks and relies on pairs staying whole within a block.
fn split_escaped(escaped: &[u8], max_len: usize) -> Vec<&[u8]> {
    let mut chunks = Vec::new();
    let mut rest = escaped;

    while !rest.is_empty() {
        let mut take = rest.len().min(max_len);
        if take < rest.len() && ends_inside_pair(&rest[..take]) {
            take -= 1;
        }
        debug_assert!(take > 0, "chunk capacity too small to make progress");

        let (head, tail) = rest.split_at(take);
        chunks.push(head);
        rest = tail;
    }

    chunks
}

/// True when the prefix ends with the opening half of an escape pair.
///
/// Escape runs always start on a pair boundary, so the parity of the
/// trailing run decides whether the final `ESCAPE` opens a pair.
fn ends_inside_pair(prefix: &[u8]) -> bool {
    let trailing = prefix.iter().rev().take_while(|&&b| b == ESCAPE).count();
    trailing % 2 == 1
}

/// Serialize a value into a fixed-width big-endian buffer.
fn to_fixed_width(value: &BigUint, width: usize) -> Result<Vec<u8>, RsaError> {
    let bytes = value.to_bytes_be();
    if bytes.len() > width {
        return Err(RsaError::ValueOverflow { needed: bytes.len(), available: width });
    }

    let mut buf = vec![0u8; width];
    buf[width - bytes.len()..].copy_from_slice(&bytes);
    Ok(buf)
}
