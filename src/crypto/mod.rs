//! Cryptographic operations for the payload codec.
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption with deterministic nonces
//! - Argon2id password-based key derivation with extra hash rounds

mod cipher;
mod kdf;

pub use cipher::{decrypt_data, encrypt_data, Cipher};
pub use kdf::KeyDerivation;
