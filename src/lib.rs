//! Steganographic Notepad
//!
//! Hides notes in the least significant bits of lossless cover images
//! (PNG and WebP) and recovers them again.
//!
//! # Features
//!
//! - **Multi-image volumes**: An ordered set of cover images acts as one bit stream
//! - **AES-256-GCM Encryption**: Optional, keyed by Argon2id plus extra hash rounds
//! - **Compression, dummies, shuffling**: Optional payload transforms driven by a seed
//! - **Clean**: Irreversibly scrub every payload bit in the images
//!
//! # Architecture
//!
//! ```text
//! Text → Codec (compress, encrypt, dummies, shuffle) → Image stream ← Chunk table
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use steg_notepad::config::StorageArguments;
//! use steg_notepad::encoding::DataEncoder;
//! use steg_notepad::notepad::{decode_text, encode_text};
//! use std::path::PathBuf;
//!
//! let mut args = StorageArguments::new(vec![PathBuf::from("cover.png")]);
//! args.encoding.password = "secret".to_string();
//!
//! encode_text("hello world", &args, &DataEncoder).unwrap();
//! let text = decode_text(&args, &DataEncoder).unwrap();
//! assert_eq!(text, "hello world");
//! ```

pub mod config;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod notepad;
pub mod storage;

pub use config::{EncodingConfig, StorageArguments};
pub use error::{Error, Result};
pub use notepad::Session;
