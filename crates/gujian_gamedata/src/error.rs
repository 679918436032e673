//! Error types that can be emitted from this library
//!

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`std::string::FromUtf8Error`]
    #[error(transparent)]
    UTF8Error(#[from] std::string::FromUtf8Error),

    /// The document does not start with a known magic number
    #[error("bad gamedata magic {0:#010x}")]
    BadMagic(u32),

    /// A value tag the format does not define
    #[error("unknown value tag {tag:#04x} at {offset:#010x}")]
    #[diagnostic(help("the document is either corrupt or uses a value type that is not supported"))]
    UnknownTag {
        /// the tag byte
        tag: u8,
        /// offset of the tag byte in the document
        offset: u64,
    },

    /// Two string leaves resolved to the same path
    #[error("duplicated string path: {0}")]
    DuplicatePath(String),

    /// An object map declared a negative number of children
    #[error("negative child count {count} at {offset:#010x}")]
    NegativeChildCount {
        /// the declared count
        count: i32,
        /// offset of the count in the document
        offset: u64,
    },

    /// A map entry keyed by nil, which would encode as the end of the map
    #[error("object map entry with a nil key")]
    #[diagnostic(help("nil can only be used as a value"))]
    NilMapKey,

    /// A string does not fit the 16 bit length prefix
    #[error("string of {0} bytes is too long to encode")]
    StringTooLong(usize),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
