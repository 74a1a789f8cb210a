//! Payload codec: the reversible transform between note bytes and the bits
//! written into cover images.
//!
//! ```text
//! bytes → compress → encrypt → insert dummies → permute → payload
//! ```

use crate::config::EncodingConfig;
use crate::crypto::{decrypt_data, encrypt_data};
use crate::encoding::compression::{compress, decompress};
use crate::encoding::dummies::{insert_dummies, remove_dummies};
use crate::encoding::permute::{permute, unpermute};
use crate::error::Result;
use tracing::debug;

/// Encoded payload ready to be written to an image stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    bytes: Vec<u8>,
}

impl EncodedPayload {
    /// Wrap already-encoded bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the payload and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Number of bits the payload occupies in the image stream.
    pub fn bit_len(&self) -> u64 {
        self.bytes.len() as u64 * 8
    }
}

/// Strategy for turning note bytes into storable payloads and back.
///
/// Implementations must satisfy `decode(encode(x, c), c) == x`.
pub trait PayloadCodec: Send + Sync {
    /// Encode raw bytes.
    fn encode(&self, data: &[u8], config: &EncodingConfig) -> Result<EncodedPayload>;

    /// Decode bytes produced by [`PayloadCodec::encode`] with the same config.
    fn decode(&self, payload: &[u8], config: &EncodingConfig) -> Result<Vec<u8>>;
}

/// The default codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataEncoder;

impl PayloadCodec for DataEncoder {
    fn encode(&self, data: &[u8], config: &EncodingConfig) -> Result<EncodedPayload> {
        let mut bytes = if config.use_compression {
            compress(data)?
        } else {
            data.to_vec()
        };

        if config.is_encrypted() {
            bytes = encrypt_data(
                &bytes,
                &config.password,
                &config.random_seed,
                config.additional_hashes,
            )?;
        }

        if config.dummy_count > 0 {
            bytes = insert_dummies(&bytes, config.dummy_count, &config.random_seed);
        }

        if config.is_randomized() {
            bytes = permute(&bytes, &config.random_seed);
        }

        debug!(
            input = data.len(),
            output = bytes.len(),
            compressed = config.use_compression,
            encrypted = config.is_encrypted(),
            dummies = config.dummy_count,
            "Encoded payload"
        );

        Ok(EncodedPayload::from_bytes(bytes))
    }

    fn decode(&self, payload: &[u8], config: &EncodingConfig) -> Result<Vec<u8>> {
        let mut bytes = if config.is_randomized() {
            unpermute(payload, &config.random_seed)
        } else {
            payload.to_vec()
        };

        if config.dummy_count > 0 {
            bytes = remove_dummies(&bytes, config.dummy_count, &config.random_seed)?;
        }

        if config.is_encrypted() {
            bytes = decrypt_data(
                &bytes,
                &config.password,
                &config.random_seed,
                config.additional_hashes,
            )?;
        }

        if config.use_compression {
            bytes = decompress(&bytes)?;
        }

        debug!(input = payload.len(), output = bytes.len(), "Decoded payload");

        Ok(bytes)
    }
}
