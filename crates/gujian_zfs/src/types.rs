//! Base types for the structure of a ZFS archive.

use binrw::{BinRead, BinWrite};
use byteorder::{LittleEndian, WriteBytesExt};
use sha1::{Digest, Sha1};
use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use crate::error::Error;

/// Magic at the start of every archive
pub const ARCHIVE_MAGIC: [u8; 4] = *b"ZFS\0";

/// Magic at the start of every index chunk
pub const CHUNK_MAGIC: [u8; 4] = *b"[IX]";

/// Number of entry slots in an index chunk
pub const MAX_ENTRIES: usize = 0x1000;

/// Size of a single index entry
pub const ENTRY_LEN: usize = 32;

/// Size of the entry slots of an index chunk
pub const INDEX_REGION_LEN: usize = MAX_ENTRIES * ENTRY_LEN;

/// Size of a chunk header, magic and next chunk offset
pub const CHUNK_HEADER_LEN: usize = 8;

/// Value found in the reserved field of every entry
pub const ENTRY_RESERVED: u16 = 0x0100;

/// Checksum algorithm guarding index entries
pub const ENTRY_CRC: crc::Crc<u16> = crc::Crc::<u16>::new(&crc::CRC_16_ARC);

/// SHA-1 of a file's contents, naming it inside an archive
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, BinRead, BinWrite)]
#[brw(little)]
pub struct ContentHash(pub [u8; 20]);

impl ContentHash {
    /// Hash `data`
    pub fn of(data: &[u8]) -> Self {
        ContentHash(Sha1::digest(data).into())
    }

    /// Whether every byte is zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({self})")
    }
}

impl FromStr for ContentHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut hash = [0u8; 20];
        hex::decode_to_slice(s, &mut hash).map_err(|_| Error::InvalidHash(s.to_owned()))?;
        Ok(ContentHash(hash))
    }
}

/// A single slot of an index chunk
///
/// All data is stored in little endian format
#[derive(BinRead, BinWrite, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[brw(little)]
pub struct IndexEntry {
    /// Hash of the file
    pub hash: ContentHash,

    /// Absolute offset of the file data, `0` for an unused slot
    pub file_offset: u32,

    /// Size of the file data
    pub compressed_size: u32,

    /// CRC-16 of the preceding 28 bytes
    pub crc16: u16,

    /// Always [`ENTRY_RESERVED`]
    pub reserved: u16,
}

impl IndexEntry {
    /// Create an entry with its checksum filled in
    pub fn new(hash: ContentHash, file_offset: u32, compressed_size: u32) -> Self {
        let mut entry = IndexEntry {
            hash,
            file_offset,
            compressed_size,
            crc16: 0,
            reserved: ENTRY_RESERVED,
        };
        entry.crc16 = entry.compute_crc16();
        entry
    }

    /// Whether the slot is unused
    pub fn is_empty(&self) -> bool {
        self.file_offset == 0
    }

    /// Compute the checksum of the hash, offset and size
    pub fn compute_crc16(&self) -> u16 {
        let mut buffer = Vec::with_capacity(28);
        buffer.extend_from_slice(&self.hash.0);
        // Writing into a Vec can not fail
        let _ = buffer.write_u32::<LittleEndian>(self.file_offset);
        let _ = buffer.write_u32::<LittleEndian>(self.compressed_size);

        ENTRY_CRC.checksum(&buffer)
    }
}

#[cfg(test)]
mod test {
    use binrw::{BinRead, BinWrite};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    use crate::error::Result;
    use crate::types::{ContentHash, IndexEntry};

    #[test]
    fn hash_of_empty_input() {
        assert_eq!(
            ContentHash::of(b"").to_string(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn parse_hash() -> Result<()> {
        let hash: ContentHash = "a9993e364706816aba3e25717850c26c9cd0d89d".parse()?;
        assert_eq!(hash, ContentHash::of(b"abc"));

        assert!("a9993e".parse::<ContentHash>().is_err());
        assert!("zz993e364706816aba3e25717850c26c9cd0d89d"
            .parse::<ContentHash>()
            .is_err());

        Ok(())
    }

    #[test]
    fn entry_layout() -> Result<()> {
        let hash = ContentHash([0x11; 20]);
        let entry = IndexEntry::new(hash, 0x0002_0010, 0x30);

        let mut bytes = Vec::new();
        entry.write(&mut Cursor::new(&mut bytes))?;

        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[..20], [0x11; 20]);
        assert_eq!(bytes[20..28], [0x10, 0x00, 0x02, 0x00, 0x30, 0x00, 0x00, 0x00]);
        assert_eq!(bytes[30..32], [0x00, 0x01]);

        let parsed = IndexEntry::read(&mut Cursor::new(&bytes))?;
        assert_eq!(parsed, entry);
        assert_eq!(parsed.crc16, parsed.compute_crc16());

        Ok(())
    }
}
