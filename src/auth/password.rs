//! Password hashing with Argon2.

use anyhow::{Result, anyhow};
use argon2::password_hash::rand_core::OsRng;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};

/// One-way salted password hashing
#[derive(Clone, Default)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a plaintext password into a PHC string
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| anyhow!("Failed to hash password: {}", e))
    }

    /// Check a plaintext password against a stored PHC string.
    /// Malformed digests never verify.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("stored password hash is not a valid PHC string: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hasher = PasswordService::new();
        let digest = hasher.hash("alif123").unwrap();

        assert_ne!(digest, "alif123");
        assert!(hasher.verify("alif123", &digest));
        assert!(!hasher.verify("alif124", &digest));
        assert!(!hasher.verify("", &digest));
    }

    #[test]
    fn test_salts_differ() {
        let hasher = PasswordService::new();
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn test_malformed_digest_never_verifies() {
        assert!(!PasswordService::new().verify("alif123", "plaintext-not-a-hash"));
    }
}
