//! Storage layer for hiding bits in cover images.
//!
//! This module handles:
//! - Validating and ordering the cover image set
//! - Presenting the images as one seekable bit stream
//! - Persisting the content chunk table at the head of the stream

mod chunk_table;
mod cover;
mod image_stream;

pub use chunk_table::{ChunkTableReader, ChunkTableWriter, ContentChunkTable};
pub use cover::{is_supported_image, CoverFormat, CoverImageSet};
pub use image_stream::{ChunkWrite, ImageStream, StreamMode};
