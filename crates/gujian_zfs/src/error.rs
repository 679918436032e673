//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

use crate::types::ContentHash;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Transparent warpper for [`std::string::FromUtf8Error`]
    #[error(transparent)]
    UTF8Error(#[from] std::string::FromUtf8Error),

    /// Transparent warpper for [`gujian_oodle::error::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    Oodle(#[from] gujian_oodle::error::Error),

    /// Transparent warpper for [`gujian_xxtea::error::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    Cipher(#[from] gujian_xxtea::error::Error),

    /// A magic number did not match
    #[error("bad {what} magic {found:02x?}")]
    BadMagic {
        /// the structure being read
        what: &'static str,
        /// the bytes found instead
        found: [u8; 4],
    },

    /// The chain of index chunks loops back on itself
    #[error("index chunk at {0:#010x} was already read")]
    ChunkCycle(u64),

    /// A hash is not 40 hexadecimal digits
    #[error("invalid content hash {0:?}")]
    #[diagnostic(help("hashes are written as 40 lowercase hexadecimal digits"))]
    InvalidHash(String),

    /// A line of a name index could not be parsed
    #[error("invalid name index line {line}: {reason}")]
    InvalidNameIndex {
        /// 1 based line number
        line: usize,
        /// what is wrong with it
        reason: String,
    },

    /// The archive grew past what 32 bit offsets can address
    #[error("archive offset {0:#x} does not fit in 32 bits")]
    OffsetOverflow(u64),

    /// Data was written without a file being started
    #[error("no file was started before writing")]
    NoFileStarted,

    /// A shard name does not follow the `dataNNN` pattern
    #[error("invalid shard name {0:?}")]
    InvalidShardName(String),

    /// unable to find requested file
    #[error("unable to find requested file")]
    FileNotFound(#[from] FileNotFoundError),
}

/// Error type to provide further information when a file has not been found
#[derive(Error, Diagnostic, Debug)]
#[error("unable to find requested file")]
pub enum FileNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by hash {0}
    #[error("by hash {0}")]
    Hash(ContentHash),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
