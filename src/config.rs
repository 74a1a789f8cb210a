//! Configuration constants and types for the notepad storage engine.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Chunk table magic number: "SNCT" in bytes.
pub const CHUNK_TABLE_MAGIC: [u8; 4] = [0x53, 0x4E, 0x43, 0x54];

/// Number of colour channels per pixel that carry a payload bit (R, G, B).
pub const BITS_PER_PIXEL: u64 = 3;

/// File extensions accepted as lossless cover images.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["png", "webp"];

/// Cover image paths longer than this are shortened for display.
pub const DISPLAY_NAME_LIMIT: usize = 30;

/// Domain label mixed into the key derivation salt.
pub const KDF_SALT_LABEL: &[u8] = b"steg-notepad/kdf-salt/v1";

/// Domain label mixed into the dummy-byte RNG seed.
pub const DUMMY_SEED_LABEL: &[u8] = b"steg-notepad/dummies/v1";

/// Domain label mixed into the permutation RNG seed.
pub const PERMUTE_SEED_LABEL: &[u8] = b"steg-notepad/permute/v1";

/// Argon2id parameters for key derivation.
pub mod argon2_params {
    /// Memory cost in KiB (19 MiB).
    pub const MEMORY_COST: u32 = 19 * 1024;

    /// Time cost (iterations).
    pub const TIME_COST: u32 = 2;

    /// Parallelism factor.
    pub const PARALLELISM: u32 = 1;

    /// Output length in bytes (256 bits).
    pub const OUTPUT_LENGTH: usize = 32;
}

/// Settings that drive the payload codec.
///
/// An encode and its matching decode must use identical values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Password used to encrypt the payload. Empty disables encryption.
    #[serde(default)]
    pub password: String,

    /// Seed used to shuffle the payload and place dummy bytes.
    /// Empty disables the shuffle.
    #[serde(default)]
    pub random_seed: String,

    /// Number of dummy bytes mixed into the payload.
    #[serde(default)]
    pub dummy_count: usize,

    /// Extra hashing rounds applied after the initial password hash.
    #[serde(default)]
    pub additional_hashes: u32,

    /// Whether the payload is DEFLATE-compressed before encryption.
    #[serde(default)]
    pub use_compression: bool,
}

impl EncodingConfig {
    /// Whether encryption is enabled.
    pub fn is_encrypted(&self) -> bool {
        !self.password.is_empty()
    }

    /// Whether the payload is shuffled.
    pub fn is_randomized(&self) -> bool {
        !self.random_seed.is_empty()
    }
}

/// Everything an encode, decode, or clean operation needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageArguments {
    /// Ordered list of cover images forming one logical volume.
    pub cover_images: Vec<PathBuf>,

    /// Codec settings.
    #[serde(flatten)]
    pub encoding: EncodingConfig,
}

impl StorageArguments {
    /// Create arguments for the given cover images with default codec settings.
    pub fn new(cover_images: Vec<PathBuf>) -> Self {
        Self {
            cover_images,
            encoding: EncodingConfig::default(),
        }
    }

    /// Validate the arguments.
    pub fn validate(&self) -> Result<()> {
        if self.cover_images.is_empty() {
            return Err(Error::NoCoverImages);
        }
        Ok(())
    }

    /// Load arguments from a JSON settings file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let args: StorageArguments = serde_json::from_str(&content)?;
        Ok(args)
    }

    /// Save arguments to a JSON settings file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
