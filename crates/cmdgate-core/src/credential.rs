//! API key generation and digesting
//!
//! Keys are random UUIDs handed to the principal once. Only their SHA-256
//! digest is stored, so a leaked database does not leak usable keys.

use cmdgate_core_types::Sensitive;
use sha2::{Digest, Sha256};

/// Generate a new API key
pub fn generate_api_key() -> Sensitive<String> {
    Sensitive::new(uuid::Uuid::new_v4().to_string())
}

/// Hex-encoded SHA-256 of an API key, as stored in the principals table
pub fn credential_digest(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_deterministic_hex() {
        let a = credential_digest("key-1");
        assert_eq!(a, credential_digest("key-1"));
        assert_eq!(a.len(), 64);
        assert_ne!(a, credential_digest("key-2"));
    }

    #[test]
    fn test_generated_keys_differ() {
        let a = generate_api_key();
        let b = generate_api_key();
        assert_ne!(a.expose(), b.expose());
    }
}
