//! Opaque string serialization of key halves.
//!
//! The public half travels and rests as `"v1:" + base64(JSON {n, e})`, with
//! the magnitudes themselves base64 big-endian. The version signature is
//! consumed and checked on deserialize; unknown signatures are rejected. The
//! private half is bare `base64(JSON {n, d})` — it only ever travels inside
//! file metadata, which carries its own versioning.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use num_bigint_dig::BigUint;
use serde::{Deserialize, Serialize};

use crate::keys::{KeyError, PrivateKey, PublicKey};

const VERSION_1_SIGNATURE: &str = "v1";
const SEPARATOR: char = ':';

#[derive(Serialize, Deserialize)]
struct PublicKeyWire {
    n: String,
    e: String,
}

#[derive(Serialize, Deserialize)]
struct PrivateKeyWire {
    n: String,
    d: String,
}

/// Serialize the public half with its version signature.
pub fn serialize_public_key(key: &PublicKey) -> String {
    let wire = PublicKeyWire { n: encode_magnitude(&key.n), e: encode_magnitude(&key.e) };
    format!("{VERSION_1_SIGNATURE}{SEPARATOR}{}", encode_json(&wire))
}

/// Deserialize a public half, rejecting unknown version signatures.
pub fn deserialize_public_key(serialized: &str) -> Result<PublicKey, KeyError> {
    let (version, payload) = consume_version_signature(serialized);
    if version != VERSION_1_SIGNATURE {
        return Err(KeyError::Encoding {
            reason: format!("unsupported version signature '{version}'"),
        });
    }

    let wire: PublicKeyWire = decode_json(payload)?;
    Ok(PublicKey { n: decode_magnitude(&wire.n, "n")?, e: decode_magnitude(&wire.e, "e")? })
}

/// Serialize the private half.
pub fn serialize_private_key(key: &PrivateKey) -> String {
    let wire = PrivateKeyWire { n: encode_magnitude(&key.n), d: encode_magnitude(&key.d) };
    encode_json(&wire)
}

/// Deserialize a private half.
pub fn deserialize_private_key(serialized: &str) -> Result<PrivateKey, KeyError> {
    let wire: PrivateKeyWire = decode_json(serialized)?;
    Ok(PrivateKey { n: decode_magnitude(&wire.n, "n")?, d: decode_magnitude(&wire.d, "d")? })
}

/// Split `"v1:payload"` into signature and payload. A string without a
/// separator has no signature.
fn consume_version_signature(serialized: &str) -> (&str, &str) {
    match serialized.split_once(SEPARATOR) {
        Some((version, payload)) => (version, payload),
        None => ("", serialized),
    }
}

fn encode_magnitude(value: &BigUint) -> String {
    BASE64.encode(value.to_bytes_be())
}

fn decode_magnitude(encoded: &str, field: &str) -> Result<BigUint, KeyError> {
    let bytes = BASE64
        .decode(encoded)
        .map_err(|e| KeyError::Encoding { reason: format!("field '{field}': {e}") })?;
    Ok(BigUint::from_bytes_be(&bytes))
}

fn encode_json<T: Serialize>(wire: &T) -> String {
    let Ok(json) = serde_json::to_string(wire) else {
        unreachable!("string-only wire structs always serialize");
    };
    BASE64.encode(json)
}

fn decode_json<T: for<'de> Deserialize<'de>>(payload: &str) -> Result<T, KeyError> {
    let bytes = BASE64
        .decode(payload)
        .map_err(|e| KeyError::Encoding { reason: format!("outer base64: {e}") })?;
    serde_json::from_slice(&bytes)
        .map_err(|e| KeyError::Encoding { reason: format!("inner JSON: {e}") })
}

#[cfg(test)]
mod tests {
    use super::{
        BigUint, KeyError, PrivateKey, PublicKey, deserialize_private_key, deserialize_public_key,
        serialize_private_key, serialize_public_key,
    };

    fn sample_public() -> PublicKey {
        PublicKey { n: BigUint::from(0xDEAD_BEEFu32), e: BigUint::from(65_537u32) }
    }

    #[test]
    fn public_key_roundtrip() {
        let key = sample_public();
        let back = deserialize_public_key(&serialize_public_key(&key)).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn private_key_roundtrip() {
        let key = PrivateKey { n: BigUint::from(0xDEAD_BEEFu32), d: BigUint::from(0x1234_5678u32) };
        let back = deserialize_private_key(&serialize_private_key(&key)).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn public_serialization_carries_version_signature() {
        let serialized = serialize_public_key(&sample_public());
        assert!(serialized.starts_with("v1:"));
    }

    #[test]
    fn unknown_version_signature_rejected() {
        let serialized = serialize_public_key(&sample_public());
        let Some(payload) = serialized.strip_prefix("v1:") else {
            unreachable!("serialized public keys carry the v1 signature");
        };

        let err = deserialize_public_key(&format!("v2:{payload}")).unwrap_err();
        assert!(matches!(err, KeyError::Encoding { reason } if reason.contains("v2")));
    }

    #[test]
    fn missing_version_signature_rejected() {
        let serialized = serialize_public_key(&sample_public());
        let Some(payload) = serialized.strip_prefix("v1:") else {
            unreachable!("serialized public keys carry the v1 signature");
        };

        assert!(deserialize_public_key(payload).is_err());
    }

    #[test]
    fn garbage_payload_rejected() {
        assert!(matches!(
            deserialize_public_key("v1:!!!not-base64!!!"),
            Err(KeyError::Encoding { .. })
        ));
        assert!(matches!(deserialize_private_key("!!!"), Err(KeyError::Encoding { .. })));
    }

    #[test]
    fn missing_fields_rejected() {
        use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
        let payload = BASE64.encode(r#"{"n":"AQ=="}"#);
        assert!(deserialize_public_key(&format!("v1:{payload}")).is_err());
        assert!(deserialize_private_key(&payload).is_err());
    }
}
