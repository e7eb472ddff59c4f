//! services/api/src/adapters/hasher.rs
//!
//! Argon2 implementation of the `CredentialHasher` port.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use salon_core::ports::{CredentialHasher, PortError, PortResult};

#[derive(Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> PortResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PortError::Unexpected(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, plain: &str, hash: &str) -> PortResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| PortError::Unexpected(format!("Failed to parse password hash: {}", e)))?;
        Ok(self
            .argon2
            .verify_password(plain.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted_and_verifiable() {
        let hasher = Argon2Hasher::new();
        let first = hasher.hash("secret123").unwrap();
        let second = hasher.hash("secret123").unwrap();
        assert_ne!(first, second);
        assert!(!first.contains("secret123"));
        assert!(hasher.verify("secret123", &first).unwrap());
        assert!(!hasher.verify("secret124", &first).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(Argon2Hasher::new().verify("x", "not-a-phc-string").is_err());
    }
}
