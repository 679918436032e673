//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// The stored header checksum does not match the header contents
    #[error("header crc mismatch: stored {expected:#06x}, computed {actual:#06x}")]
    HeaderCrcMismatch {
        /// checksum stored in the frame
        expected: u16,
        /// checksum computed from the header fields
        actual: u16,
    },

    /// The header describes a frame that can not exist
    #[error("invalid oodle frame: {0}")]
    InvalidFrame(String),

    /// A chunk did not decompress to the size it declared
    #[error("chunk {chunk} decompressed to {actual} bytes, expected {expected}")]
    ChunkSizeMismatch {
        /// index of the chunk in the frame
        chunk: usize,
        /// declared size
        expected: usize,
        /// size produced by the codec
        actual: usize,
    },

    /// The codec failed
    #[error("codec error: {0}")]
    Codec(String),

    /// The codec does not provide this operation
    #[error("unsupported by codec: {0}")]
    Unsupported(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
