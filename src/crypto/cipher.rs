//! AES-256-GCM authenticated encryption with synthetic nonces.

use crate::crypto::kdf::KeyDerivation;
use crate::error::{Error, Result};
use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use sha2::{Digest, Sha256};

/// Nonce size for AES-GCM (96 bits).
const NONCE_SIZE: usize = 12;

/// Authentication tag size (128 bits).
const TAG_SIZE: usize = 16;

/// AES-256-GCM cipher wrapper.
pub struct Cipher {
    cipher: Aes256Gcm,
    key: [u8; 32],
}

impl Cipher {
    /// Create a new cipher from a derived key.
    pub fn new(key: [u8; 32]) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
        Self { cipher, key }
    }

    /// Nonce bound to the key and plaintext, so equal inputs encrypt equally.
    fn synthetic_nonce(&self, plaintext: &[u8]) -> [u8; NONCE_SIZE] {
        let mut hasher = Sha256::new();
        hasher.update(self.key);
        hasher.update(plaintext);
        let digest = hasher.finalize();

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&digest[..NONCE_SIZE]);
        nonce
    }

    /// Encrypt data.
    ///
    /// Returns: nonce (12 bytes) || ciphertext || tag (16 bytes)
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce_bytes = self.synthetic_nonce(plaintext);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| Error::Encryption(e.to_string()))?;

        let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&ciphertext);

        Ok(result)
    }

    /// Decrypt data that was encrypted with `encrypt`.
    ///
    /// Expects: nonce (12 bytes) || ciphertext || tag (16 bytes)
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < NONCE_SIZE + TAG_SIZE {
            return Err(Error::Decryption);
        }

        let (nonce_bytes, ciphertext) = ciphertext.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| Error::Decryption)
    }
}

/// Encrypt data with a password.
///
/// The key is derived with [`KeyDerivation::from_seed`], so the random seed and
/// hash iteration count must match on decryption.
pub fn encrypt_data(
    plaintext: &[u8],
    password: &str,
    random_seed: &str,
    additional_hashes: u32,
) -> Result<Vec<u8>> {
    let key = KeyDerivation::from_seed(random_seed).derive_key(password, additional_hashes)?;
    Cipher::new(key).encrypt(plaintext)
}

/// Decrypt data with a password.
pub fn decrypt_data(
    ciphertext: &[u8],
    password: &str,
    random_seed: &str,
    additional_hashes: u32,
) -> Result<Vec<u8>> {
    let key = KeyDerivation::from_seed(random_seed).derive_key(password, additional_hashes)?;
    Cipher::new(key).decrypt(ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let plaintext = b"Hello, World! This is a secret message.";
        let password = "secure_password_123";

        let encrypted = encrypt_data(plaintext, password, "", 0).unwrap();
        let decrypted = decrypt_data(&encrypted, password, "", 0).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_wrong_password_fails() {
        let plaintext = b"Secret data";
        let encrypted = encrypt_data(plaintext, "correct_password", "", 0).unwrap();

        let result = decrypt_data(&encrypted, "wrong_password", "", 0);
        assert!(matches!(result, Err(Error::Decryption)));
    }

    #[test]
    fn test_wrong_iteration_count_fails() {
        let encrypted = encrypt_data(b"Secret data", "password", "", 3).unwrap();

        assert!(decrypt_data(&encrypted, "password", "", 2).is_err());
        assert!(decrypt_data(&encrypted, "password", "", 3).is_ok());
    }

    #[test]
    fn test_encryption_is_deterministic() {
        let cipher = Cipher::new([9u8; 32]);

        let first = cipher.encrypt(b"Same message").unwrap();
        let second = cipher.encrypt(b"Same message").unwrap();
        let other = cipher.encrypt(b"Other message").unwrap();

        assert_eq!(first, second);
        assert_ne!(first[..NONCE_SIZE], other[..NONCE_SIZE]);
    }

    #[test]
    fn test_empty_plaintext() {
        let cipher = Cipher::new([1u8; 32]);

        let encrypted = cipher.encrypt(b"").unwrap();
        assert_eq!(encrypted.len(), NONCE_SIZE + TAG_SIZE);
        assert!(cipher.decrypt(&encrypted).unwrap().is_empty());
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let cipher = Cipher::new([3u8; 32]);

        let mut encrypted = cipher.encrypt(b"Secret data").unwrap();
        if let Some(byte) = encrypted.last_mut() {
            *byte ^= 0xFF;
        }

        assert!(matches!(cipher.decrypt(&encrypted), Err(Error::Decryption)));
    }

    #[test]
    fn test_truncated_ciphertext_fails() {
        let cipher = Cipher::new([3u8; 32]);
        assert!(matches!(cipher.decrypt(&[0u8; 10]), Err(Error::Decryption)));
    }
}
