//! Irreversible scrubbing of every payload bit in the cover images.

use crate::error::Result;
use crate::storage::{CoverImageSet, ImageStream, StreamMode};
use tracing::info;

/// Overwrite the full capacity of the cover images with random bits.
///
/// Does not read or require a chunk table. Returns the number of bit slots
/// overwritten.
pub fn clean_images(covers: &CoverImageSet) -> Result<u64> {
    let mut stream = ImageStream::open(covers, StreamMode::Write)?;
    stream.seek_to_bit(0)?;

    let mut rng = rand::thread_rng();
    let overwritten = stream.fill_random(&mut rng)?;
    stream.close()?;

    info!(bits = overwritten, images = covers.len(), "Cleaned cover images");
    Ok(overwritten)
}
