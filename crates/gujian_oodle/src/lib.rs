//! This library handles reading from and creating the **Oodle** compressed frames used by *GuJian 3*.
//!
//! Almost every file the game loads from its archives is wrapped in such a frame. The frame only
//! describes how the data was cut into chunks; the chunks themselves are compressed by the
//! proprietary Oodle library. This crate parses and builds frames and hands the chunk payloads to
//! an [`OodleCodec`].
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field              | Description                                              |
//! |----------------|--------------------|----------------------------------------------------------|
//! | 0x0000         | Raw Size           | 8 bytes: size of the data once decompressed              |
//! | 0x0008         | Timestamp          | 8 bytes: seconds since the unix epoch                    |
//! | 0x0010         | Compressed Size    | 8 bytes: size of the frame                               |
//! | 0x0018         | Seek Chunk Length  | 4 bytes: raw bytes held by every chunk but the last      |
//! | 0x001C         | Compression        | 2 bytes: `0` stored, `4` compressed                      |
//! | 0x001E         | CRC-16             | 2 bytes: CRC-16/ARC of the preceding 30 bytes            |
//!
//! A stored frame is followed by `Raw Size` bytes of data.
//!
//! A compressed frame is followed by a table of `ceil(Raw Size / Seek Chunk Length)` 4 byte
//! chunk sizes, then by the chunks. Each chunk is a 4 byte decompressed size followed by
//! `chunk size - 4` bytes of compressed payload.
//!
//! ## Additional Information
//!
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Codecs**: [`Ooz`] decompresses without the native library, `NativeOodle` (feature
//!   `native`) loads `oo2core` at run time and can compress as well
//!

pub mod codec;
pub mod compression;
pub mod error;
#[cfg(feature = "native")]
pub mod native;
pub mod read;
pub mod types;
pub mod write;

pub use codec::{OodleCodec, Ooz};
pub use compression::{CompressionLevel, CompressionMethod, Compressor, CompressorOptions};
#[cfg(feature = "native")]
pub use native::NativeOodle;
pub use read::decompress;
pub use types::{OodleChunk, OodleFile, OodleHeader};
pub use write::compress;
