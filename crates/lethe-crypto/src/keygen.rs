//! Key-pair generation with constrained exponents.
//!
//! Prime generation is the one piece delegated to a vetted library
//! (`num-bigint-dig`'s Miller-Rabin generator, a port of Go's `math/big`).
//! Everything after the primes is custom: λ(n) = lcm(p−1, q−1), a public
//! exponent drawn uniformly from `[MIN_EXPONENT, n)`, and its modular
//! inverse, both required to clear [`MIN_EXPONENT`].

use num_bigint_dig::{BigUint, ModInverse, RandBigInt, RandPrime};
use num_integer::Integer;
use num_traits::One;
use rand::rngs::OsRng;

use crate::keys::{KEY_BITS, KeyError, KeyPair, MIN_EXPONENT, PrivateKey, PublicKey};

const PRIME_BITS: usize = KEY_BITS / 2;

/// Retry budget for drawing a public exponent with a usable inverse.
const MAX_EXPONENT_ATTEMPTS: usize = 100;

/// Generate a key pair with a full-width modulus and constrained exponents.
///
/// # Errors
///
/// [`KeyError::GenerationExhausted`] if no exponent draw yields an inverse
/// above [`MIN_EXPONENT`] within the retry budget.
pub fn generate() -> Result<KeyPair, KeyError> {
    let mut rng = OsRng;

    // The generator sets the top bits of each prime, but the product can
    // still come up one bit short; regenerate until n is exactly full width.
    let (n, lambda_n) = loop {
        let p = rng.gen_prime(PRIME_BITS);
        let q = rng.gen_prime(PRIME_BITS);
        if p == q {
            continue;
        }

        let n = &p * &q;
        if n.bits() == KEY_BITS {
            let one = BigUint::one();
            break (n, (&p - &one).lcm(&(&q - &one)));
        }
    };

    let (e, d) = constrained_exponents(&mut rng, &n, &lambda_n)?;

    Ok(KeyPair { public: PublicKey { n: n.clone(), e }, private: PrivateKey { n, d } })
}

/// Draw `e` uniformly from `[MIN_EXPONENT, n)` until `e⁻¹ mod λ(n)` exists
/// and also exceeds `MIN_EXPONENT`.
fn constrained_exponents(
    rng: &mut OsRng,
    n: &BigUint,
    lambda_n: &BigUint,
) -> Result<(BigUint, BigUint), KeyError> {
    let min = BigUint::from(MIN_EXPONENT);

    for _ in 0..MAX_EXPONENT_ATTEMPTS {
        let e = rng.gen_biguint_range(&min, n);

        let Some(d) = (&e).mod_inverse(lambda_n).and_then(|d| d.to_biguint()) else {
            continue;
        };

        if d > min {
            return Ok((e, d));
        }
    }

    Err(KeyError::GenerationExhausted { attempts: MAX_EXPONENT_ATTEMPTS })
}
