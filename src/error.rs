//! Error types for the steganographic notepad.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for notepad operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding, storing, or decoding notes.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A setting could not be parsed or is out of range.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// No cover images were selected.
    #[error("At least one cover image is required")]
    NoCoverImages,

    /// The same cover image was listed twice.
    #[error("Cover image listed more than once: {0}")]
    DuplicateCoverImage(PathBuf),

    /// Cover image path does not exist.
    #[error("Cover image not found: {0}")]
    ImageNotFound(PathBuf),

    /// Cover image is not a lossless format we can write bits into.
    #[error("Unsupported cover image format (expected .png or .webp): {0}")]
    UnsupportedFormat(PathBuf),

    /// Cover image pixels are not 8-bit RGB or RGBA, so they cannot be
    /// rewritten without changing more than the low bits.
    #[error("Unsupported cover image color type {color} (expected 8-bit RGB or RGBA): {path}")]
    UnsupportedColorType { path: PathBuf, color: String },

    /// Cover image could not be decoded.
    #[error("Could not load image {path}: {reason}")]
    ImageLoad { path: PathBuf, reason: String },

    /// Cover image could not be written back to disk.
    #[error("Could not save image {path}: {reason}")]
    ImageSave { path: PathBuf, reason: String },

    /// Payload does not fit into the cover images.
    #[error("Not enough image capacity: need {needed} bits, have {available} bits")]
    InsufficientCapacity { needed: u64, available: u64 },

    /// Seek target lies past the end of the image set.
    #[error("Position {position} is out of bounds (capacity {capacity} bits)")]
    OutOfBounds { position: u64, capacity: u64 },

    /// The stream ended before the requested number of bits could be read.
    #[error("Unexpected end of image data: requested {requested} bits, {available} remaining")]
    InsufficientData { requested: u64, available: u64 },

    /// Attempted to write through a stream opened for reading.
    #[error("Image stream was opened read-only")]
    ReadOnlyStream,

    /// Chunk table is missing or corrupt.
    #[error("Invalid content chunk table: {0}")]
    ChunkTable(String),

    /// Encryption error.
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Decryption error (wrong password or corrupted data).
    #[error("Decryption failed: wrong password or corrupted data")]
    Decryption,

    /// Key derivation error.
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Compression error.
    #[error("Compression failed: {0}")]
    Compression(String),

    /// Decompression error.
    #[error("Decompression failed: {0}")]
    Decompression(String),

    /// Removing dummy bytes left an impossible payload length.
    #[error("Encoded payload of {length} bytes cannot hold {dummy_count} dummy bytes")]
    DummyLength { length: usize, dummy_count: usize },

    /// Decoded content is not valid UTF-8 text.
    #[error("Decoded content is not valid UTF-8 text")]
    InvalidText,

    /// Another operation is still running against the cover images.
    #[error("An operation is already in progress")]
    Busy,

    /// A background operation panicked before returning a result.
    #[error("Background operation panicked")]
    OperationPanicked,

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Whether the error belongs to the decode failure family
    /// (wrong password, corrupted payload, or bad compression stream).
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Error::Decryption
                | Error::Decompression(_)
                | Error::DummyLength { .. }
                | Error::InvalidText
                | Error::KeyDerivation(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
