//! Content chunk table stored at the head of the image stream.
//!
//! Layout (bincode, fixed-width little-endian integers):
//!
//! ```text
//! magic "SNCT" (4 bytes) | entry count (u64) | entry 0 (u32) | ... | entry n-1 (u32)
//! ```
//!
//! Each entry is the bit length of one content chunk in write order. The table
//! size depends only on the entry count, so the region can be reserved before
//! any content is written. Content starts at the first whole pixel after it.

use crate::config::{BITS_PER_PIXEL, CHUNK_TABLE_MAGIC};
use crate::error::{Error, Result};
use crate::storage::cover::CoverImageSet;
use crate::storage::image_stream::{ChunkWrite, ImageStream, StreamMode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Size of the fixed header: magic + entry count.
const HEADER_BYTES: u64 = 4 + 8;

/// Size of one entry.
const ENTRY_BYTES: u64 = 4;

/// Serialized header, read first to learn the entry count.
#[derive(Debug, Serialize, Deserialize)]
struct TableHeader {
    magic: [u8; 4],
    count: u64,
}

/// Full serialized table.
#[derive(Debug, Serialize, Deserialize)]
struct TableRecord {
    magic: [u8; 4],
    lengths: Vec<u32>,
}

/// Ordered bit lengths of the content chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChunkTable {
    lengths: Vec<u32>,
}

impl ContentChunkTable {
    /// Create a table from chunk bit lengths.
    pub fn new(lengths: Vec<u32>) -> Self {
        Self { lengths }
    }

    /// Chunk bit lengths in write order.
    pub fn lengths(&self) -> &[u32] {
        &self.lengths
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Sum of all chunk lengths in bits.
    pub fn total_bits(&self) -> u64 {
        self.lengths.iter().map(|&l| l as u64).sum()
    }

    /// Bits needed to store a table with `entries` entries.
    pub fn required_bits(entries: usize) -> u64 {
        (HEADER_BYTES + ENTRY_BYTES * entries as u64) * 8
    }

    /// First pixel after a table with `entries` entries.
    pub fn content_start_pixel(entries: usize) -> u64 {
        Self::required_bits(entries).div_ceil(BITS_PER_PIXEL)
    }

    /// First bit slot after a table with `entries` entries.
    pub fn content_start_bit(entries: usize) -> u64 {
        Self::content_start_pixel(entries) * BITS_PER_PIXEL
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let record = TableRecord {
            magic: CHUNK_TABLE_MAGIC,
            lengths: self.lengths.clone(),
        };
        Ok(bincode::serialize(&record)?)
    }
}

/// Writes the chunk table through its own write stream.
pub struct ChunkTableWriter {
    covers: CoverImageSet,
}

impl ChunkTableWriter {
    /// Create a writer over the given cover images.
    pub fn new(covers: &CoverImageSet) -> Self {
        Self {
            covers: covers.clone(),
        }
    }

    /// Serialize the table at bit 0 and save the images.
    ///
    /// The table and every chunk it describes must fit in the cover images,
    /// otherwise nothing is written.
    pub fn write_content_chunk_table(&self, lengths: &[u32]) -> Result<()> {
        if lengths.is_empty() {
            return Err(Error::ChunkTable(
                "table must contain at least one chunk".to_string(),
            ));
        }

        let table = ContentChunkTable::new(lengths.to_vec());
        let bytes = table.to_bytes()?;

        let mut stream = ImageStream::open(&self.covers, StreamMode::Write)?;
        let capacity = stream.capacity_bits();
        let table_bits = ContentChunkTable::required_bits(table.len());
        if table_bits > capacity {
            return Err(Error::InsufficientCapacity {
                needed: table_bits,
                available: capacity,
            });
        }

        let needed = ContentChunkTable::content_start_bit(table.len()) + table.total_bits();
        if needed > capacity {
            return Err(Error::ChunkTable(format!(
                "chunks need {} bits but the images hold {}",
                needed, capacity
            )));
        }

        stream.seek_to_bit(0)?;
        match stream.write_content_chunk(&bytes)? {
            ChunkWrite::Written(bits) => {
                debug!(entries = table.len(), bits, "Wrote content chunk table");
            }
            ChunkWrite::InsufficientCapacity => {
                return Err(Error::InsufficientCapacity {
                    needed: bytes.len() as u64 * 8,
                    available: stream.capacity_bits(),
                });
            }
        }
        stream.close()?;

        info!(entries = table.len(), total_bits = table.total_bits(), "Saved content chunk table");
        Ok(())
    }
}

/// Reads the chunk table from an open stream.
pub struct ChunkTableReader;

impl ChunkTableReader {
    /// Read and validate the table at bit 0.
    ///
    /// Leaves the cursor directly after the table entries.
    pub fn read_content_chunk_table(stream: &mut ImageStream) -> Result<ContentChunkTable> {
        let capacity = stream.capacity_bits();
        if capacity < ContentChunkTable::required_bits(1) {
            return Err(Error::ChunkTable(
                "images are too small to hold a chunk table".to_string(),
            ));
        }

        stream.seek_to_bit(0)?;
        let header_bytes = stream.read_content_chunk(HEADER_BYTES * 8)?;
        let header: TableHeader = bincode::deserialize(&header_bytes)
            .map_err(|e| Error::ChunkTable(e.to_string()))?;

        if header.magic != CHUNK_TABLE_MAGIC {
            return Err(Error::ChunkTable(
                "no chunk table found (bad magic)".to_string(),
            ));
        }

        let max_entries = (capacity / 8).saturating_sub(HEADER_BYTES) / ENTRY_BYTES;
        if header.count == 0 || header.count > max_entries {
            return Err(Error::ChunkTable(format!(
                "implausible entry count {}",
                header.count
            )));
        }
        let count = header.count as usize;

        let entry_bytes = stream.read_content_chunk(ENTRY_BYTES * 8 * header.count)?;
        let mut record_bytes = header_bytes;
        record_bytes.extend_from_slice(&entry_bytes);
        let record: TableRecord = bincode::deserialize(&record_bytes)
            .map_err(|e| Error::ChunkTable(e.to_string()))?;

        let table = ContentChunkTable::new(record.lengths);
        let content_capacity = capacity.saturating_sub(ContentChunkTable::content_start_bit(count));
        if table.total_bits() > content_capacity {
            return Err(Error::ChunkTable(format!(
                "chunks claim {} bits but only {} are available",
                table.total_bits(),
                content_capacity
            )));
        }

        debug!(entries = table.len(), total_bits = table.total_bits(), "Read content chunk table");
        Ok(table)
    }
}
