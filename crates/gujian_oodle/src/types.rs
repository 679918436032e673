//! Base types for the structure of an Oodle frame.

use binrw::{BinRead, BinWrite};
use byteorder::{LittleEndian, WriteBytesExt};

use crate::compression::CompressionMethod;

/// Size of the frame header, checksum included
pub const HEADER_LEN: usize = 32;

/// Number of header bytes covered by the checksum
pub const HEADER_CRC_LEN: usize = 30;

/// Checksum algorithm guarding the frame header
pub const HEADER_CRC: crc::Crc<u16> = crc::Crc::<u16>::new(&crc::CRC_16_ARC);

/// Oodle frame header
///
/// All data is stored in little endian format
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct OodleHeader {
    /// Size of the data once decompressed
    pub raw_size: i64,

    /// Creation time in seconds since the unix epoch
    pub timestamp: i64,

    /// Size of the frame in the file
    pub compressed_size: i64,

    /// Amount of raw data held by every chunk except the last
    pub seek_chunk_len: i32,

    /// `0` for a single stored chunk, anything else for compressed chunks
    pub compression: u16,

    /// CRC-16 of the preceding 30 bytes
    pub crc16: u16,
}

impl OodleHeader {
    /// How the chunks of this frame are stored
    pub fn method(&self) -> CompressionMethod {
        CompressionMethod::from(self.compression)
    }

    /// Compute the checksum of the header fields
    pub fn compute_crc16(&self) -> u16 {
        let mut buffer = Vec::with_capacity(HEADER_CRC_LEN);
        // Writing into a Vec can not fail
        let _ = buffer.write_i64::<LittleEndian>(self.raw_size);
        let _ = buffer.write_i64::<LittleEndian>(self.timestamp);
        let _ = buffer.write_i64::<LittleEndian>(self.compressed_size);
        let _ = buffer.write_i32::<LittleEndian>(self.seek_chunk_len);
        let _ = buffer.write_u16::<LittleEndian>(self.compression);

        HEADER_CRC.checksum(&buffer)
    }

    /// Number of chunks a compressed frame holds
    pub fn chunk_count(&self) -> usize {
        if self.raw_size <= 0 || self.seek_chunk_len <= 0 {
            return 0;
        }
        let raw = self.raw_size as u64;
        let seek = self.seek_chunk_len as u64;
        raw.div_ceil(seek) as usize
    }
}

/// A single chunk of an Oodle frame
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OodleChunk {
    /// Size of the chunk once decompressed
    pub decompressed_size: i32,

    /// Size of the chunk in the file, including its 4 byte size prefix
    pub compressed_size: i32,

    /// Opaque data handed to the codec
    pub payload: Vec<u8>,
}

/// A parsed Oodle frame
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OodleFile {
    /// Frame header
    pub header: OodleHeader,

    /// Chunks in order
    pub chunks: Vec<OodleChunk>,
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::BinRead;
    use binrw::BinWrite;
    use pretty_assertions::assert_eq;

    use crate::error::Result;
    use crate::types::{OodleHeader, HEADER_CRC};

    #[test]
    fn crc_is_arc_variant() {
        assert_eq!(HEADER_CRC.checksum(b"123456789"), 0xBB3D);
    }

    #[test]
    fn read_stored_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x0B, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x20, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x04, 0x00,
            0x00, 0x00,
            0x2D, 0x20,
        ]);

        let expected = OodleHeader {
            raw_size: 11,
            compressed_size: 0x20,
            seek_chunk_len: 0x40000,
            crc16: 0x202D,
            ..Default::default()
        };

        let header = OodleHeader::read(&mut input)?;
        assert_eq!(header, expected);
        assert_eq!(header.compute_crc16(), header.crc16);

        Ok(())
    }

    #[test]
    fn write_compressed_header() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x10, 0x5E, 0x5F, 0x00, 0x00, 0x00, 0x00,
            0x38, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x04, 0x00,
            0x04, 0x00,
            0x02, 0xF3,
        ];

        let mut header = OodleHeader {
            raw_size: 0x50000,
            timestamp: 0x5F5E1000,
            compressed_size: 0x38,
            seek_chunk_len: 0x40000,
            compression: 4,
            crc16: 0,
        };
        header.crc16 = header.compute_crc16();

        let mut actual = Vec::new();
        header.write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn chunk_count_rounds_up() {
        let header = OodleHeader {
            raw_size: 0x40001,
            seek_chunk_len: 0x40000,
            compression: 4,
            ..Default::default()
        };
        assert_eq!(header.chunk_count(), 2);

        let empty = OodleHeader {
            seek_chunk_len: 0x40000,
            compression: 4,
            ..Default::default()
        };
        assert_eq!(empty.chunk_count(), 0);
    }
}
