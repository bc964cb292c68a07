//! Content and canonical-JSON hashing.
//!
//! Every digest is `blake3:<hex>`. Structured values are hashed over their
//! RFC 8785 canonical JSON encoding so that key order and whitespace never
//! change a hash.
use crate::error::HashError;
use serde::Serialize;

/// Hashes raw bytes.
pub fn hash_bytes(data: &[u8]) -> String {
    format!("blake3:{}", blake3::hash(data))
}

/// Hashes the canonical JSON encoding of `value`.
pub fn hash_canonical<T: Serialize + ?Sized>(value: &T) -> Result<String, HashError> {
    let bytes = serde_jcs::to_vec(value).map_err(|e| HashError::Canonicalize(e.to_string()))?;
    Ok(hash_bytes(&bytes))
}

/// Digest binding an input hash to an output hash.
pub fn determinism_hash(input_hash: &str, output_hash: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(input_hash.as_bytes());
    hasher.update(output_hash.as_bytes());
    format!("blake3:{}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hash_bytes_prefix_and_stability() {
        let a = hash_bytes(b"hello");
        assert!(a.starts_with("blake3:"));
        assert_eq!(a.len(), "blake3:".len() + 64);
        assert_eq!(a, hash_bytes(b"hello"));
        assert_ne!(a, hash_bytes(b"hello "));
    }

    #[test]
    fn test_canonical_hash_ignores_key_order() {
        let a = hash_canonical(&json!({ "a": 1, "b": [1, 2] })).unwrap();
        let b = hash_canonical(&json!({ "b": [1, 2], "a": 1 })).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_determinism_hash_is_concatenation_digest() {
        let combined = determinism_hash("blake3:aa", "blake3:bb");
        assert_eq!(combined, hash_bytes(b"blake3:aablake3:bb"));
        assert_ne!(combined, determinism_hash("blake3:bb", "blake3:aa"));
    }
}
