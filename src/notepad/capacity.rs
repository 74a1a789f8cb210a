//! Capacity reporting for a cover image set.

use crate::error::Result;
use crate::storage::{ContentChunkTable, CoverImageSet, ImageStream, StreamMode};
use std::path::PathBuf;

/// Storage capacity of a cover image set.
#[derive(Debug, Clone)]
pub struct CapacityReport {
    /// Capacity of each image in bits, in stream order.
    pub images: Vec<(PathBuf, u64)>,
    /// Total capacity in bits.
    pub total_bits: u64,
    /// Bits reserved for a one-entry chunk table, rounded up to a pixel.
    pub table_bits: u64,
    /// Largest encoded payload, in bytes, a single note can occupy.
    pub max_payload_bytes: u64,
}

/// Measure the cover images without modifying them.
pub fn capacity_report(covers: &CoverImageSet) -> Result<CapacityReport> {
    let stream = ImageStream::open(covers, StreamMode::Read)?;
    let total_bits = stream.capacity_bits();
    let table_bits = ContentChunkTable::content_start_bit(1);
    let images = stream.image_capacities();
    stream.close()?;

    Ok(CapacityReport {
        images,
        total_bits,
        table_bits,
        max_payload_bytes: total_bits.saturating_sub(table_bits) / 8,
    })
}
