//! Types for writing Oodle frames
//!

use binrw::BinWrite;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{Cursor, Write};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, instrument};

use crate::codec::OodleCodec;
use crate::compression::{CompressionMethod, CompressorOptions};
use crate::error::{Error, Result};
use crate::types::{OodleChunk, OodleFile, OodleHeader, HEADER_LEN};

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn chunk_len(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| Error::InvalidFrame(format!("chunk of {len} bytes")))
}

impl OodleFile {
    /// Pack `data` into a frame
    ///
    /// [`CompressionLevel::None`](crate::CompressionLevel::None) produces a single stored chunk.
    /// Any other level cuts the data into windows of the codec's seek chunk length and
    /// compresses each of them.
    #[instrument(skip(data, codec), fields(len = data.len()), err)]
    pub fn compress<C: OodleCodec + ?Sized>(
        data: &[u8],
        codec: &C,
        options: &CompressorOptions,
    ) -> Result<OodleFile> {
        let method = options.method();
        let raw_size = data.len() as i64;
        let seek_chunk_len = codec.seek_chunk_len(raw_size);

        let mut header = OodleHeader {
            raw_size,
            timestamp: options.timestamp.unwrap_or_else(now),
            compressed_size: HEADER_LEN as i64,
            seek_chunk_len,
            compression: method.header_value(),
            crc16: 0,
        };

        let chunks = match method {
            CompressionMethod::Stored => {
                let size = chunk_len(data.len())?;
                vec![OodleChunk {
                    decompressed_size: size,
                    compressed_size: size,
                    payload: data.to_vec(),
                }]
            }
            CompressionMethod::Compressed => {
                if seek_chunk_len <= 0 {
                    return Err(Error::InvalidFrame(format!(
                        "seek chunk length {seek_chunk_len}"
                    )));
                }

                let mut chunks = Vec::new();
                for window in data.chunks(seek_chunk_len as usize) {
                    let payload =
                        codec.compress(window, options.compressor, options.level, seek_chunk_len)?;
                    let compressed_size = chunk_len(payload.len() + 4)?;

                    header.compressed_size += i64::from(compressed_size) + 4;
                    chunks.push(OodleChunk {
                        decompressed_size: chunk_len(window.len())?,
                        compressed_size,
                        payload,
                    });
                }
                chunks
            }
        };

        header.crc16 = header.compute_crc16();

        debug!(
            raw_size,
            chunks = chunks.len(),
            compressed_size = header.compressed_size,
            "packed oodle frame"
        );

        Ok(OodleFile { header, chunks })
    }

    /// Serialize the frame, recomputing the header checksum
    #[instrument(skip_all, err)]
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        let mut header = self.header;
        header.crc16 = header.compute_crc16();

        let mut raw = Cursor::new(Vec::with_capacity(HEADER_LEN));
        header.write(&mut raw)?;
        writer.write_all(raw.get_ref())?;

        match header.method() {
            CompressionMethod::Stored => {
                if let Some(chunk) = self.chunks.first() {
                    writer.write_all(&chunk.payload)?;
                }
            }
            CompressionMethod::Compressed => {
                for chunk in &self.chunks {
                    writer.write_i32::<LittleEndian>(chunk.compressed_size)?;
                }
                for chunk in &self.chunks {
                    writer.write_i32::<LittleEndian>(chunk.decompressed_size)?;
                    writer.write_all(&chunk.payload)?;
                }
            }
        }

        Ok(())
    }

    /// Serialize the frame into a new buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write(&mut buffer)?;
        Ok(buffer)
    }
}

/// Compress `data` with `codec` and write the frame to `writer`
pub fn compress<W: Write, C: OodleCodec + ?Sized>(
    data: &[u8],
    codec: &C,
    options: &CompressorOptions,
    writer: W,
) -> Result<()> {
    OodleFile::compress(data, codec, options)?.write(writer)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::codec::Ooz;
    use crate::compression::{CompressionLevel, CompressorOptions};
    use crate::error::{Error, Result};
    use crate::types::OodleFile;

    #[test]
    fn write_stored_frame() -> Result<()> {
        let options = CompressorOptions::builder()
            .level(CompressionLevel::None)
            .timestamp(0)
            .build();

        let file = OodleFile::compress(b"hello world", &Ooz, &options)?;
        assert_eq!(file.header.compressed_size, 0x20);
        assert_eq!(file.header.compression, 0);

        #[rustfmt::skip]
        let mut expected = vec![
            0x0B, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x20, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x04, 0x00,
            0x00, 0x00,
            0x2D, 0x20,
        ];
        expected.extend_from_slice(b"hello world");

        assert_eq!(file.to_bytes()?, expected);

        Ok(())
    }

    #[test]
    fn write_recomputes_crc() -> Result<()> {
        let options = CompressorOptions::builder()
            .level(CompressionLevel::None)
            .timestamp(0)
            .build();

        let mut file = OodleFile::compress(b"hello world", &Ooz, &options)?;
        file.header.crc16 = 0;

        let bytes = file.to_bytes()?;
        assert_eq!(bytes[30..32], [0x2D, 0x20]);

        Ok(())
    }

    #[test]
    fn ooz_can_only_store() {
        let options = CompressorOptions::builder().timestamp(0).build();

        assert!(matches!(
            OodleFile::compress(b"hello world", &Ooz, &options),
            Err(Error::Unsupported(_))
        ));
    }
}
