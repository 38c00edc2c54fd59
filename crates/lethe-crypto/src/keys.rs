//! Key model and validation for the chunked RSA engine.
//!
//! A key half is a `(modulus, exponent)` pair over [`BigUint`]. Validation
//! runs before every encrypt and decrypt: a modulus below 2048 bits or an
//! exponent below [`MIN_EXPONENT`] is a hard error, never silently tolerated.

use std::fmt;

use num_bigint_dig::BigUint;
use thiserror::Error;

/// Required modulus width in bits.
pub const KEY_BITS: usize = 2048;

/// Smallest accepted exponent, public or private.
///
/// Degenerate small-exponent pairs would make the deterministic chunked
/// scheme invertible without the other half.
pub const MIN_EXPONENT: u64 = 256;

/// Errors from key validation, generation, and serialization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Key failed validation; `reason` lists every violated rule.
    #[error("invalid key: {reason}")]
    Invalid {
        /// All violations, "; "-joined.
        reason: String,
    },

    /// No exponent pair satisfied the constraints within the retry budget.
    #[error("failed to generate a valid exponent pair after {attempts} attempts")]
    GenerationExhausted {
        /// How many candidate exponents were drawn.
        attempts: usize,
    },

    /// A serialized key could not be decoded.
    #[error("malformed serialized key: {reason}")]
    Encoding {
        /// What failed while decoding.
        reason: String,
    },
}

/// Public half: modulus and public exponent. Held by the custodian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// Modulus.
    pub n: BigUint,
    /// Public exponent.
    pub e: BigUint,
}

/// Private half: modulus and private exponent. Handed to the client, never
/// retained by the custodian.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    /// Modulus.
    pub n: BigUint,
    /// Private exponent.
    pub d: BigUint,
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey").field("n", &self.n).field("d", &"<redacted>").finish()
    }
}

/// A freshly generated pair of halves.
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// The half the custodian keeps.
    pub public: PublicKey,
    /// The half the client keeps.
    pub private: PrivateKey,
}

impl PublicKey {
    /// Check modulus and exponent bounds.
    pub fn validate(&self) -> Result<(), KeyError> {
        validate_parts(&self.n, &self.e)
    }
}

impl PrivateKey {
    /// Check modulus and exponent bounds.
    pub fn validate(&self) -> Result<(), KeyError> {
        validate_parts(&self.n, &self.d)
    }
}

/// Collect every violated rule so a caller sees all problems at once.
fn validate_parts(n: &BigUint, exponent: &BigUint) -> Result<(), KeyError> {
    let mut problems = Vec::new();

    if n.bits() == 0 {
        problems.push("modulus is zero".to_string());
    } else if n.bits() < KEY_BITS {
        problems.push(format!("modulus too small: {} bits < {KEY_BITS} bits", n.bits()));
    }

    if exponent.bits() == 0 {
        problems.push("exponent is zero".to_string());
    } else if *exponent < BigUint::from(MIN_EXPONENT) {
        problems.push(format!("exponent too small: {exponent} < {MIN_EXPONENT}"));
    }

    if problems.is_empty() { Ok(()) } else { Err(KeyError::Invalid { reason: problems.join("; ") }) }
}

#[cfg(test)]
mod tests {
    use super::{BigUint, KEY_BITS, KeyError, MIN_EXPONENT, PrivateKey, PublicKey};
    use num_traits::One;

    fn full_width_modulus() -> BigUint {
        BigUint::one() << (KEY_BITS - 1)
    }

    #[test]
    fn valid_key_passes() {
        let key = PublicKey { n: full_width_modulus(), e: BigUint::from(MIN_EXPONENT) };
        assert!(key.validate().is_ok());
    }

    #[test]
    fn zero_modulus_rejected() {
        let key = PublicKey { n: BigUint::from(0u8), e: BigUint::from(MIN_EXPONENT) };
        let err = key.validate().unwrap_err();
        assert!(matches!(err, KeyError::Invalid { reason } if reason.contains("modulus is zero")));
    }

    #[test]
    fn narrow_modulus_rejected() {
        let key = PublicKey { n: BigUint::from(3233u32), e: BigUint::from(MIN_EXPONENT) };
        let err = key.validate().unwrap_err();
        assert!(matches!(err, KeyError::Invalid { reason } if reason.contains("modulus too small")));
    }

    #[test]
    fn small_exponent_rejected() {
        let key = PrivateKey { n: full_width_modulus(), d: BigUint::from(MIN_EXPONENT - 1) };
        let err = key.validate().unwrap_err();
        assert!(matches!(err, KeyError::Invalid { reason } if reason.contains("exponent too small")));
    }

    #[test]
    fn all_violations_reported_together() {
        let key = PublicKey { n: BigUint::from(7u8), e: BigUint::from(1u8) };
        let KeyError::Invalid { reason } = key.validate().unwrap_err() else {
            unreachable!("expected validation error");
        };
        assert!(reason.contains("modulus too small"));
        assert!(reason.contains("exponent too small"));
        assert!(reason.contains("; "));
    }

    #[test]
    fn private_key_debug_redacts_exponent() {
        let key = PrivateKey { n: BigUint::from(7u8), d: BigUint::from(42u8) };
        let rendered = format!("{key:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("42"));
    }
}
