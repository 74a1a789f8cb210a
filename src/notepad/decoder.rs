//! Load path: chunk table → content chunks → payload → note text.

use crate::config::StorageArguments;
use crate::encoding::PayloadCodec;
use crate::error::{Error, Result};
use crate::storage::{ChunkTableReader, ContentChunkTable, CoverImageSet, ImageStream, StreamMode};
use tracing::{debug, info};

/// Recover note text hidden in the cover images.
///
/// Chunks are read in table order, decoded individually, and concatenated
/// before the UTF-8 conversion.
pub fn decode_text(args: &StorageArguments, codec: &dyn PayloadCodec) -> Result<String> {
    let covers = CoverImageSet::from_arguments(args)?;
    let mut stream = ImageStream::open(&covers, StreamMode::Read)?;

    let table = ChunkTableReader::read_content_chunk_table(&mut stream)?;
    stream.seek_to_pixel(ContentChunkTable::content_start_pixel(table.len()))?;

    let mut content = Vec::new();
    for (index, &length) in table.lengths().iter().enumerate() {
        let chunk = stream.read_content_chunk(length as u64)?;
        let decoded = codec.decode(&chunk, &args.encoding)?;
        debug!(index, bits = length, bytes = decoded.len(), "Decoded content chunk");
        content.extend_from_slice(&decoded);
    }
    stream.close()?;

    let text = String::from_utf8(content).map_err(|_| Error::InvalidText)?;
    info!(chars = text.chars().count(), chunks = table.len(), "Loaded note");
    Ok(text)
}
