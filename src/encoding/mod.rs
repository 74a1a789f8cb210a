//! Payload codec for note content.
//!
//! This module provides:
//! - The [`PayloadCodec`] strategy trait and its default [`DataEncoder`]
//! - Gzip compression
//! - Seeded dummy-byte insertion and byte permutation

mod codec;
mod compression;
mod dummies;
mod permute;

pub use codec::{DataEncoder, EncodedPayload, PayloadCodec};
pub use compression::{compress, decompress};
pub use dummies::{insert_dummies, remove_dummies};
pub use permute::{permute, unpermute};
