//! SHA-256 checksums of migration SQL

use sha2::{Digest, Sha256};

pub fn compute_checksum(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_shape_and_determinism() {
        let a = compute_checksum("CREATE TABLE t (id INTEGER)");
        assert_eq!(a.len(), 64);
        assert_eq!(a, compute_checksum("CREATE TABLE t (id INTEGER)"));
        assert_ne!(a, compute_checksum("CREATE TABLE u (id INTEGER)"));
    }
}
