//! Argon2id key derivation for password-based encryption.

use crate::config::{argon2_params, KDF_SALT_LABEL};
use crate::error::{Error, Result};
use argon2::{Algorithm, Argon2, Params, Version};
use sha2::{Digest, Sha256};

/// Deterministic key derivation.
///
/// The salt is derived from the random seed rather than generated, because
/// nothing besides the hidden bits themselves is persisted: the same password,
/// seed, and iteration count must always produce the same key.
#[derive(Debug, Clone)]
pub struct KeyDerivation {
    salt: [u8; 32],
}

impl KeyDerivation {
    /// Create a KDF whose salt is bound to the given random seed.
    pub fn from_seed(random_seed: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(KDF_SALT_LABEL);
        hasher.update(random_seed.as_bytes());
        Self {
            salt: hasher.finalize().into(),
        }
    }

    /// Create a KDF from an explicit salt.
    pub fn from_salt(salt: [u8; 32]) -> Self {
        Self { salt }
    }

    /// Get the salt.
    pub fn salt(&self) -> &[u8; 32] {
        &self.salt
    }

    /// Derive a 256-bit key from a password.
    ///
    /// The password is hashed `1 + additional_hashes` times: one Argon2id pass
    /// followed by `additional_hashes` SHA-256 rounds over the previous output.
    pub fn derive_key(&self, password: &str, additional_hashes: u32) -> Result<[u8; 32]> {
        let params = Params::new(
            argon2_params::MEMORY_COST,
            argon2_params::TIME_COST,
            argon2_params::PARALLELISM,
            Some(argon2_params::OUTPUT_LENGTH),
        )
        .map_err(|e| Error::KeyDerivation(e.to_string()))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = [0u8; 32];
        argon2
            .hash_password_into(password.as_bytes(), &self.salt, &mut key)
            .map_err(|e| Error::KeyDerivation(e.to_string()))?;

        for _ in 0..additional_hashes {
            key = Sha256::digest(key).into();
        }

        Ok(key)
    }
}
