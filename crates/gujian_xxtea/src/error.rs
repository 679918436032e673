//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// The cipher was used before a key was supplied or resolved
    #[error("uninitialized key")]
    #[diagnostic(help("pass a key explicitly or add the file to the key table"))]
    UninitializedKey,

    /// The key material can not be turned into a cipher key
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A line of a key table could not be parsed
    #[error("invalid key table entry on line {line}")]
    InvalidKeyTable {
        /// 1-based line number
        line: usize,
    },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
