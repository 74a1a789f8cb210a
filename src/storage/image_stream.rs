//! Cover images as one continuous, seekable bit channel.
//!
//! Every pixel contributes three bit slots: the least significant bits of its
//! red, green, and blue channels, in that order. Pixels are visited in raster
//! order and images in cover set order, so slot `n` of the stream is a fixed
//! location for a given cover set. Bytes are stored least significant bit
//! first.

use crate::config::BITS_PER_PIXEL;
use crate::error::{Error, Result};
use crate::storage::cover::{CoverFormat, CoverImageSet};
use image::{ColorType, DynamicImage, RgbaImage};
use rand::RngCore;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Channels per pixel in the RGBA working buffer.
const RGBA_CHANNELS: usize = 4;

/// How a stream was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// Read bits; images on disk are never touched.
    Read,
    /// Read and write bits; modified images are saved on [`ImageStream::close`].
    Write,
}

/// Outcome of writing a content chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkWrite {
    /// The chunk was written; holds the number of bits written.
    Written(u64),
    /// The remaining capacity could not hold the chunk. Nothing was written.
    InsufficientCapacity,
}

/// One decoded cover image held in memory.
struct CoverBuffer {
    path: PathBuf,
    format: CoverFormat,
    width: u32,
    height: u32,
    has_alpha: bool,
    /// RGBA8 pixel data.
    pixels: Vec<u8>,
    /// First stream slot belonging to this image.
    start: u64,
    /// Number of bit slots in this image.
    capacity: u64,
    modified: bool,
}

impl CoverBuffer {
    fn load(path: &Path, start: u64) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ImageNotFound(path.to_path_buf()));
        }
        let format = CoverFormat::from_path(path)
            .ok_or_else(|| Error::UnsupportedFormat(path.to_path_buf()))?;

        let image = image::open(path).map_err(|e| Error::ImageLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let color = image.color();
        if !matches!(color, ColorType::Rgb8 | ColorType::Rgba8) {
            return Err(Error::UnsupportedColorType {
                path: path.to_path_buf(),
                color: format!("{:?}", color),
            });
        }

        let has_alpha = color.has_alpha();
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let capacity = width as u64 * height as u64 * BITS_PER_PIXEL;

        Ok(Self {
            path: path.to_path_buf(),
            format,
            width,
            height,
            has_alpha,
            pixels: rgba.into_raw(),
            start,
            capacity,
            modified: false,
        })
    }

    /// Byte index in `pixels` of a local bit slot.
    fn byte_index(local: u64) -> usize {
        let pixel = (local / BITS_PER_PIXEL) as usize;
        let channel = (local % BITS_PER_PIXEL) as usize;
        pixel * RGBA_CHANNELS + channel
    }

    fn get_bit(&self, local: u64) -> u8 {
        self.pixels[Self::byte_index(local)] & 1
    }

    fn set_bit(&mut self, local: u64, bit: u8) {
        let idx = Self::byte_index(local);
        self.pixels[idx] = (self.pixels[idx] & 0xFE) | (bit & 1);
        self.modified = true;
    }

    fn save(&self) -> Result<()> {
        let save_err = |reason: String| Error::ImageSave {
            path: self.path.clone(),
            reason,
        };

        let rgba = RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| save_err("pixel buffer does not match image dimensions".to_string()))?;

        let image = if self.has_alpha {
            DynamicImage::ImageRgba8(rgba)
        } else {
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8())
        };

        image
            .save_with_format(&self.path, self.format.image_format())
            .map_err(|e| save_err(e.to_string()))
    }
}

/// A sequential bit cursor over a cover image set.
///
/// One stream owns one cursor; every read or write advances it.
pub struct ImageStream {
    mode: StreamMode,
    images: Vec<CoverBuffer>,
    capacity: u64,
    position: u64,
    closed: bool,
}

impl ImageStream {
    /// Open a stream over the given cover images.
    ///
    /// Loads every image into memory and computes the total bit capacity.
    pub fn open(covers: &CoverImageSet, mode: StreamMode) -> Result<Self> {
        let mut images = Vec::with_capacity(covers.len());
        let mut capacity = 0u64;

        for path in covers.paths() {
            let buffer = CoverBuffer::load(path, capacity)?;
            debug!(path = %path.display(), width = buffer.width, height = buffer.height, bits = buffer.capacity, "Loaded cover image");
            capacity += buffer.capacity;
            images.push(buffer);
        }

        info!(images = images.len(), capacity_bits = capacity, ?mode, "Opened image stream");

        Ok(Self {
            mode,
            images,
            capacity,
            position: 0,
            closed: false,
        })
    }

    /// Mode the stream was opened in.
    pub fn mode(&self) -> StreamMode {
        self.mode
    }

    /// Total bit slots across all images.
    pub fn capacity_bits(&self) -> u64 {
        self.capacity
    }

    /// Bit slots between the cursor and the end of the stream.
    pub fn remaining_bits(&self) -> u64 {
        self.capacity - self.position
    }

    /// Current cursor position in bit slots.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Capacity of each image in bit slots, in stream order.
    pub fn image_capacities(&self) -> Vec<(PathBuf, u64)> {
        self.images
            .iter()
            .map(|i| (i.path.clone(), i.capacity))
            .collect()
    }

    /// Move the cursor to an absolute bit slot.
    ///
    /// Seeking to exactly the capacity is allowed and leaves nothing to read.
    pub fn seek_to_bit(&mut self, position: u64) -> Result<()> {
        if position > self.capacity {
            return Err(Error::OutOfBounds {
                position,
                capacity: self.capacity,
            });
        }
        self.position = position;
        Ok(())
    }

    /// Move the cursor to the first slot of an absolute pixel.
    pub fn seek_to_pixel(&mut self, pixel: u64) -> Result<()> {
        let position = pixel.checked_mul(BITS_PER_PIXEL).ok_or(Error::OutOfBounds {
            position: u64::MAX,
            capacity: self.capacity,
        })?;
        self.seek_to_bit(position)
    }

    /// Image index and local slot for a stream slot.
    fn locate(&self, slot: u64) -> (usize, u64) {
        let index = self.images.partition_point(|i| i.start + i.capacity <= slot);
        (index, slot - self.images[index].start)
    }

    fn read_bit(&self, slot: u64) -> u8 {
        let (index, local) = self.locate(slot);
        self.images[index].get_bit(local)
    }

    fn write_bit(&mut self, slot: u64, bit: u8) {
        let (index, local) = self.locate(slot);
        self.images[index].set_bit(local, bit);
    }

    /// Write a content chunk at the cursor, spanning images as needed.
    ///
    /// Returns [`ChunkWrite::InsufficientCapacity`] without touching any
    /// pixel if the chunk does not fit in the remaining capacity.
    pub fn write_content_chunk(&mut self, data: &[u8]) -> Result<ChunkWrite> {
        if self.mode == StreamMode::Read {
            return Err(Error::ReadOnlyStream);
        }

        let bits = data.len() as u64 * 8;
        if bits > self.remaining_bits() {
            debug!(needed = bits, remaining = self.remaining_bits(), "Chunk does not fit");
            return Ok(ChunkWrite::InsufficientCapacity);
        }

        let mut slot = self.position;
        for byte in data {
            for shift in 0..8 {
                self.write_bit(slot, (byte >> shift) & 1);
                slot += 1;
            }
        }
        self.position = slot;

        debug!(bits, position = self.position, "Wrote content chunk");
        Ok(ChunkWrite::Written(bits))
    }

    /// Read `bits` bits from the cursor.
    ///
    /// A trailing partial byte is zero-padded in its high bits.
    pub fn read_content_chunk(&mut self, bits: u64) -> Result<Vec<u8>> {
        if bits > self.remaining_bits() {
            return Err(Error::InsufficientData {
                requested: bits,
                available: self.remaining_bits(),
            });
        }

        let mut output = vec![0u8; bits.div_ceil(8) as usize];
        for i in 0..bits {
            let bit = self.read_bit(self.position + i);
            output[(i / 8) as usize] |= bit << (i % 8);
        }
        self.position += bits;

        debug!(bits, position = self.position, "Read content chunk");
        Ok(output)
    }

    /// Overwrite every slot from the cursor to the end with random bits.
    ///
    /// Returns the number of slots overwritten.
    pub fn fill_random<R: RngCore>(&mut self, rng: &mut R) -> Result<u64> {
        if self.mode == StreamMode::Read {
            return Err(Error::ReadOnlyStream);
        }

        let start = self.position;
        let mut slot = start;
        while slot < self.capacity {
            let word = rng.next_u64();
            let run = (self.capacity - slot).min(64);
            for shift in 0..run {
                self.write_bit(slot, ((word >> shift) & 1) as u8);
                slot += 1;
            }
        }
        self.position = slot;

        Ok(slot - start)
    }

    /// Finish the stream.
    ///
    /// In write mode every modified image is saved back to its path, once.
    /// In read mode this only releases the buffers.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;

        if self.mode == StreamMode::Read {
            return Ok(());
        }

        for image in self.images.iter().filter(|i| i.modified) {
            image.save()?;
            info!(path = %image.path.display(), "Saved cover image");
        }
        Ok(())
    }
}

impl Drop for ImageStream {
    fn drop(&mut self) {
        if !self.closed && self.mode == StreamMode::Write && self.images.iter().any(|i| i.modified) {
            warn!("Image stream dropped without close; discarding unsaved pixel changes");
        }
    }
}
