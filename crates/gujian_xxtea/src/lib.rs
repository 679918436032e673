//! This library handles decrypting and encrypting the protected files used by *GuJian 3*.
//!
//! # Cipher Documentation
//!
//! Protected files are encrypted with a modified **XXTEA** (corrected block TEA). The file is
//! processed front to back in windows of 256 bytes, each window being treated as a block of
//! 64 little-endian words.
//!
//! | Part of the file           | Treatment                                                   |
//! |----------------------------|-------------------------------------------------------------|
//! | Every full 256 byte window | XXTEA block of 64 words                                     |
//! | Remainder of 8+ bytes      | XXTEA block of `remainder / 4` words                        |
//! | Remainder of 4..8 bytes    | The whole word is left untouched                            |
//! | Final 0..3 bytes           | `byte[i] ^= (len - i) ^ 0xB7`                               |
//!
//! The block routine uses `delta = 0x9E3779B9` and `6 + 52 / n` rounds.
//!
//! ## Keys
//!
//! Keys are 128 bits, read as four little-endian words. There are two sources:
//!
//! - **Secret**: the first 16 bytes of an ASCII secret are used directly, see [`CipherKey::from_secret`].
//! - **Per-file**: a 40 character key string, looked up by file path suffix in a [`KeyTable`], is
//!   folded into 16 bytes, see [`CipherKey::from_file_key`].
//!

pub mod cipher;
pub mod error;
pub mod key;

pub use cipher::Xxtea;
pub use key::{CipherKey, KeyTable};
