//! The XXTEA variant used to protect files.

use std::io::{Read, Write};

use byteorder::{ByteOrder, LittleEndian};
use tracing::instrument;

use crate::error::{Error, Result};
use crate::key::{CipherKey, KeyTable};

/// XXTEA key schedule constant
pub const DELTA: u32 = 0x9E37_79B9;

/// Size in bytes of the windows the buffer transform works on
pub const WINDOW_LEN: usize = 256;

/// Size of the buffers used by the streaming helpers
pub const STREAM_BUFFER_LEN: usize = 0x1000;

#[inline(always)]
fn mx(sum: u32, y: u32, z: u32, p: usize, e: u32, key: &CipherKey) -> u32 {
    let v1 = (z >> 5) ^ (y << 2);
    let v2 = (y >> 3) ^ (z << 4);
    let v3 = sum ^ y;
    let v4 = key.0[(p & 3) ^ e as usize] ^ z;
    v1.wrapping_add(v2) ^ v3.wrapping_add(v4)
}

#[inline(always)]
fn rounds(n: usize) -> u32 {
    6 + 52 / n as u32
}

/// Decrypt a block of words in place. Blocks of fewer than two words are left untouched.
pub fn decrypt_block(data: &mut [u32], key: &CipherKey) {
    let n = data.len();
    if n < 2 {
        return;
    }

    let mut rounds = rounds(n);
    let mut sum = rounds.wrapping_mul(DELTA);
    let mut y = data[0];

    while rounds > 0 {
        let e = (sum >> 2) & 3;
        for p in (0..n).rev() {
            let z = if p > 0 { data[p - 1] } else { data[n - 1] };
            data[p] = data[p].wrapping_sub(mx(sum, y, z, p, e, key));
            y = data[p];
        }

        sum = sum.wrapping_sub(DELTA);
        rounds -= 1;
    }
}

/// Encrypt a block of words in place. Blocks of fewer than two words are left untouched.
pub fn encrypt_block(data: &mut [u32], key: &CipherKey) {
    let n = data.len();
    if n < 2 {
        return;
    }

    let mut sum = 0u32;
    let mut z = data[n - 1];

    for _ in 0..rounds(n) {
        sum = sum.wrapping_add(DELTA);
        let e = (sum >> 2) & 3;
        for p in 0..n {
            let y = data[(p + 1) % n];
            data[p] = data[p].wrapping_add(mx(sum, y, z, p, e, key));
            z = data[p];
        }
    }
}

fn transform_words(bytes: &mut [u8], key: &CipherKey, block: fn(&mut [u32], &CipherKey)) {
    let mut words = vec![0u32; bytes.len() / 4];
    LittleEndian::read_u32_into(bytes, &mut words);
    block(&mut words, key);
    LittleEndian::write_u32_into(&words, bytes);
}

fn transform(buffer: &mut [u8], key: &CipherKey, block: fn(&mut [u32], &CipherKey)) {
    let mut windows = buffer.chunks_exact_mut(WINDOW_LEN);
    for window in &mut windows {
        transform_words(window, key, block);
    }

    let remainder = windows.into_remainder();
    let remainder_len = remainder.len();
    let word_count = remainder_len / 4;

    // A lone trailing word is left as it is
    if word_count > 1 {
        transform_words(&mut remainder[..word_count * 4], key, block);
    }

    for i in word_count * 4..remainder_len {
        remainder[i] ^= ((remainder_len - i) as u8) ^ 0xB7;
    }
}

/// Buffer level XXTEA transform
///
/// ```
/// # fn doit() -> gujian_xxtea::error::Result<()> {
/// use gujian_xxtea::{CipherKey, Xxtea};
///
/// let cipher = Xxtea::with_key(CipherKey::from_secret("0123456789abcdef")?);
///
/// let mut data = b"some protected file contents".to_vec();
/// cipher.encrypt(&mut data)?;
/// cipher.decrypt(&mut data)?;
/// assert_eq!(data, b"some protected file contents");
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Xxtea {
    key: Option<CipherKey>,
}

impl Xxtea {
    /// Create a cipher without a key. Using it fails until a key is set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cipher using `key`
    pub fn with_key(key: CipherKey) -> Self {
        Xxtea { key: Some(key) }
    }

    /// Create a cipher with the key the table holds for `path`, if any
    pub fn for_path(table: &KeyTable, path: &str) -> Self {
        Xxtea {
            key: table.resolve(path),
        }
    }

    /// Replace the key
    pub fn set_key(&mut self, key: CipherKey) {
        self.key = Some(key);
    }

    /// The key in use
    pub fn key(&self) -> Option<&CipherKey> {
        self.key.as_ref()
    }

    fn require_key(&self) -> Result<&CipherKey> {
        self.key.as_ref().ok_or(Error::UninitializedKey)
    }

    /// Decrypt `buffer` in place
    pub fn decrypt(&self, buffer: &mut [u8]) -> Result<()> {
        transform(buffer, self.require_key()?, decrypt_block);
        Ok(())
    }

    /// Encrypt `buffer` in place
    pub fn encrypt(&self, buffer: &mut [u8]) -> Result<()> {
        transform(buffer, self.require_key()?, encrypt_block);
        Ok(())
    }

    /// Decrypt everything from `reader` into `writer`, returning the number of bytes processed
    #[instrument(skip_all, err)]
    pub fn decrypt_stream<R: Read, W: Write>(&self, reader: R, writer: W) -> Result<u64> {
        let key = *self.require_key()?;
        stream(reader, writer, &key, decrypt_block)
    }

    /// Encrypt everything from `reader` into `writer`, returning the number of bytes processed
    #[instrument(skip_all, err)]
    pub fn encrypt_stream<R: Read, W: Write>(&self, reader: R, writer: W) -> Result<u64> {
        let key = *self.require_key()?;
        stream(reader, writer, &key, encrypt_block)
    }
}

fn stream<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    key: &CipherKey,
    block: fn(&mut [u32], &CipherKey),
) -> Result<u64> {
    let mut total = 0u64;
    let mut buffer = Vec::with_capacity(STREAM_BUFFER_LEN);
    loop {
        buffer.clear();
        let read = reader
            .by_ref()
            .take(STREAM_BUFFER_LEN as u64)
            .read_to_end(&mut buffer)?;
        if read == 0 {
            break;
        }

        transform(&mut buffer, key, block);
        writer.write_all(&buffer)?;
        total += read as u64;
    }
    writer.flush()?;
    Ok(total)
}
