//! Password reset secret generation and hashing.
//!
//! The raw secret only ever leaves this process inside the reset link.
//! Storage and lookup go through [`hash_reset_token`].

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Generate a cryptographically random reset secret of `len` bytes,
/// hex-encoded (32 bytes → 64 lowercase hex chars).
pub fn generate_reset_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 hash of a raw reset secret, hex-encoded.
///
/// This is the value stored in the database as `password_reset.token_hash`.
pub fn hash_reset_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_64_hex_chars() {
        let token = generate_reset_token(32);
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_reset_token(32), generate_reset_token(32));
    }

    #[test]
    fn hash_is_deterministic_sha256_hex() {
        let h1 = hash_reset_token("abc");
        let h2 = hash_reset_token("abc");
        assert_eq!(h1, h2);
        assert_eq!(
            h1,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hash_differs_from_secret() {
        let raw = generate_reset_token(32);
        let hash = hash_reset_token(&raw);
        assert_eq!(hash.len(), 64);
        assert_ne!(raw, hash);
    }
}
