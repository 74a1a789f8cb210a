//! Save path: note text → payload → image stream → chunk table.

use crate::config::StorageArguments;
use crate::encoding::PayloadCodec;
use crate::error::{Error, Result};
use crate::storage::{
    ChunkTableWriter, ChunkWrite, ContentChunkTable, CoverImageSet, ImageStream, StreamMode,
};
use tracing::{info, warn};

/// Encode note text and hide it in the cover images.
///
/// The content chunk is written first, behind the reserved table region;
/// the one-entry chunk table is written afterwards through a separate stream.
/// If the payload does not fit, nothing on disk is modified and
/// [`Error::InsufficientCapacity`] is returned.
///
/// Returns the number of bits written for the content chunk.
pub fn encode_text(
    text: &str,
    args: &StorageArguments,
    codec: &dyn PayloadCodec,
) -> Result<u64> {
    let covers = CoverImageSet::from_arguments(args)?;
    let payload = codec.encode(text.as_bytes(), &args.encoding)?;

    let start_pixel = ContentChunkTable::content_start_pixel(1);
    let start_bit = ContentChunkTable::content_start_bit(1);

    let mut stream = ImageStream::open(&covers, StreamMode::Write)?;
    let capacity = stream.capacity_bits();
    let needed = start_bit + payload.bit_len();

    let length = u32::try_from(payload.bit_len()).map_err(|_| Error::InsufficientCapacity {
        needed,
        available: capacity,
    })?;

    if capacity < start_bit {
        warn!(needed, capacity, "Cover images cannot hold the chunk table");
        return Err(Error::InsufficientCapacity {
            needed,
            available: capacity,
        });
    }

    stream.seek_to_pixel(start_pixel)?;
    let written = match stream.write_content_chunk(payload.as_bytes())? {
        ChunkWrite::Written(bits) => bits,
        ChunkWrite::InsufficientCapacity => {
            warn!(needed, capacity, "Note does not fit in cover images; nothing written");
            return Err(Error::InsufficientCapacity {
                needed,
                available: capacity,
            });
        }
    };
    stream.close()?;

    ChunkTableWriter::new(&covers).write_content_chunk_table(&[length])?;

    info!(chars = text.chars().count(), bits = written, images = covers.len(), "Saved note");
    Ok(written)
}
