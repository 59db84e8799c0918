//! Content hashing, options digests, and seed derivation.
//!
//! Everything here is a pure function of its input bytes so the same photo
//! and options always map to the same cache key, seed, and variation order.

use std::borrow::Cow;

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::EngineError;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Unwrap a `data:<mime>;base64,<payload>` URL into the binary it carries.
///
/// Anything that is not a data URL is returned untouched, so raw uploads
/// and data-URL uploads of the same image hash identically.
pub fn strip_data_url(input: &[u8]) -> Result<Cow<'_, [u8]>, EngineError> {
    let Some(rest) = input.strip_prefix(b"data:") else {
        return Ok(Cow::Borrowed(input));
    };
    let Some(comma) = rest.iter().position(|&b| b == b',') else {
        return Err(EngineError::InvalidPhotoEncoding("data URL has no payload separator".into()));
    };
    let (header, payload) = (&rest[..comma], &rest[comma + 1..]);

    if header.ends_with(b";base64") {
        let cleaned: Vec<u8> = payload.iter().copied().filter(|b| !b.is_ascii_whitespace()).collect();
        let decoded = B64
            .decode(&cleaned)
            .map_err(|e| EngineError::InvalidPhotoEncoding(format!("invalid base64 payload: {e}")))?;
        Ok(Cow::Owned(decoded))
    } else {
        Ok(Cow::Borrowed(payload))
    }
}

/// SHA-256 hex of the photo's binary content.
pub fn compute_content_hash(photo: &[u8]) -> Result<String, EngineError> {
    Ok(sha256_hex(&strip_data_url(photo)?))
}

/// Serialize JSON with every object's keys sorted, recursively.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // A JSON string's Display is its quoted, escaped form.
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// SHA-256 hex of the canonical JSON form of the analysis options.
pub fn options_digest(options: &Value) -> String {
    sha256_hex(canonical_json(options).as_bytes())
}

/// First eight bytes, big-endian, of `SHA-256("{content_hash}:{options_digest}")`.
pub fn compute_seed(content_hash: &str, options_digest: &str) -> u64 {
    let digest = Sha256::digest(format!("{content_hash}:{options_digest}").as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Seeded permutation of `0..n`.
///
/// Stable for a given seed as long as the `rand` major version is unchanged.
pub fn variation_order(seed: u64, n: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);
    order
}
