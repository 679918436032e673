//! The boundary to the Oodle compressor.
//!
//! Frames only describe how compressed chunks are laid out. Compressing and decompressing a
//! chunk is left to an [`OodleCodec`], which is normally backed by the proprietary native
//! library. [`Ooz`] provides decompression without it.

use tracing::instrument;

use crate::compression::{CompressionLevel, Compressor};
use crate::error::{Error, Result};

/// Smallest seek chunk the native library produces
pub const MIN_SEEK_CHUNK_LEN: i32 = 0x40000;

/// Number of seek points requested when sizing chunks
pub const DESIRED_SEEK_POINTS: i32 = 16;

/// Operations a frame needs from the Oodle library
///
/// Implementations are called synchronously, one chunk at a time. Callers sharing a codec
/// between threads must make sure the underlying library tolerates it.
pub trait OodleCodec {
    /// Compress a single window of raw data
    fn compress(
        &self,
        data: &[u8],
        compressor: Compressor,
        level: CompressionLevel,
        seek_chunk_len: i32,
    ) -> Result<Vec<u8>>;

    /// Decompress a single chunk payload that is known to expand to `decompressed_len` bytes
    fn decompress(&self, data: &[u8], decompressed_len: usize) -> Result<Vec<u8>>;

    /// Pick the seek chunk length for data of `raw_size` bytes
    fn seek_chunk_len(&self, raw_size: i64) -> i32;
}

/// Compute a seek chunk length giving about `desired_seek_points` chunks.
///
/// The result is a power of two, never smaller than [`MIN_SEEK_CHUNK_LEN`].
pub fn make_seek_chunk_len(raw_size: i64, desired_seek_points: i32) -> i32 {
    let target = raw_size.max(0) / i64::from(desired_seek_points.max(1));

    let mut len = i64::from(MIN_SEEK_CHUNK_LEN);
    while len < target && len < (1 << 30) {
        len <<= 1;
    }
    len as i32
}

/// Pure Rust decompressor for Kraken, Mermaid, Selkie and Leviathan chunks
///
/// Compression is not available, frames can only be built with [`CompressionLevel::None`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Ooz;

impl OodleCodec for Ooz {
    fn compress(
        &self,
        _data: &[u8],
        compressor: Compressor,
        level: CompressionLevel,
        _seek_chunk_len: i32,
    ) -> Result<Vec<u8>> {
        Err(Error::Unsupported(format!(
            "compressing with {compressor:?} at level {level:?} needs the native oodle library"
        )))
    }

    #[instrument(skip(self, data), fields(compressed = data.len()), err)]
    fn decompress(&self, data: &[u8], decompressed_len: usize) -> Result<Vec<u8>> {
        let mut output = vec![0u8; decompressed_len];
        let mut extractor = oozextract::Extractor::new();
        extractor
            .read_from_slice(data, &mut output)
            .map_err(|e| Error::Codec(format!("oodle decompress failed: {e:?}")))?;
        Ok(output)
    }

    fn seek_chunk_len(&self, raw_size: i64) -> i32 {
        make_seek_chunk_len(raw_size, DESIRED_SEEK_POINTS)
    }
}
