//! Compression method, compressor and level identifiers.

use bon::Builder;

/// Identifies how the chunks of a frame are stored
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum CompressionMethod {
    /// A single chunk holding the data as it is
    Stored,

    /// Seekable chunks compressed by an Oodle compressor
    #[default]
    Compressed,
}

impl CompressionMethod {
    /// Value written to the frame header
    pub const fn header_value(self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Compressed => 4,
        }
    }
}

impl From<u16> for CompressionMethod {
    fn from(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            _ => CompressionMethod::Compressed,
        }
    }
}

/// Oodle compressor identifiers, as understood by the native library
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[repr(i32)]
pub enum Compressor {
    /// No compression
    None = 3,
    /// Kraken, used by the game for its own files
    #[default]
    Kraken = 8,
    /// Leviathan
    Leviathan = 13,
    /// Mermaid
    Mermaid = 9,
    /// Selkie
    Selkie = 11,
    /// Hydra
    Hydra = 12,
}

/// Oodle compression levels
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[repr(i32)]
pub enum CompressionLevel {
    /// Store the data without compressing it
    None = 0,
    /// Fastest of the regular levels
    SuperFast = 1,
    /// Fast, with a slightly better ratio than [`CompressionLevel::SuperFast`]
    VeryFast = 2,
    /// Fast with a reasonable ratio
    Fast = 3,
    /// Balanced speed and ratio
    Normal = 4,
    /// First of the optimal parse levels
    Optimal1 = 5,
    /// Optimal parse, more effort than [`CompressionLevel::Optimal1`]
    Optimal2 = 6,
    /// Level used by the game's own files
    #[default]
    Optimal3 = 7,
    /// Optimal parse, more effort than [`CompressionLevel::Optimal3`]
    Optimal4 = 8,
    /// Smallest output, slowest to compress
    Optimal5 = 9,
    /// Trades ratio for speed, faster than [`CompressionLevel::SuperFast`]
    HyperFast1 = -1,
    /// Faster than [`CompressionLevel::HyperFast1`]
    HyperFast2 = -2,
    /// Faster than [`CompressionLevel::HyperFast2`]
    HyperFast3 = -3,
    /// Fastest level that still compresses
    HyperFast4 = -4,
}

/// Options for how data should be packed into a frame
#[derive(Debug, Clone, Copy, Default, Builder)]
pub struct CompressorOptions {
    /// The compressor to hand to the codec
    #[builder(default)]
    pub compressor: Compressor,

    /// The compression level; [`CompressionLevel::None`] produces a stored frame
    #[builder(default)]
    pub level: CompressionLevel,

    /// Seconds since the unix epoch to record in the header, the current time when unset
    pub timestamp: Option<i64>,
}

impl CompressorOptions {
    /// The method a frame built with these options will use
    pub fn method(&self) -> CompressionMethod {
        match self.level {
            CompressionLevel::None => CompressionMethod::Stored,
            _ => CompressionMethod::Compressed,
        }
    }
}
