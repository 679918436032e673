//! Types for reading Oodle frames
//!

use binrw::BinRead;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};
use tracing::{debug, instrument};

use crate::codec::OodleCodec;
use crate::compression::CompressionMethod;
use crate::error::{Error, Result};
use crate::types::{OodleChunk, OodleFile, OodleHeader, HEADER_LEN};

fn read_bytes<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    // Sizes come from the file, so the buffer only grows with what is actually there
    let mut buffer = Vec::new();
    let read = reader.by_ref().take(len as u64).read_to_end(&mut buffer)?;
    if read != len {
        return Err(Error::IOError(std::io::ErrorKind::UnexpectedEof.into()));
    }
    Ok(buffer)
}

impl OodleFile {
    /// Parse a frame, header checksum included
    ///
    /// The payloads are kept as they are in the file, see [`OodleFile::decompress`].
    #[instrument(skip_all, err)]
    pub fn read<R: Read>(mut reader: R) -> Result<OodleFile> {
        let mut raw = [0u8; HEADER_LEN];
        reader.read_exact(&mut raw)?;
        let header = OodleHeader::read(&mut Cursor::new(&raw))?;

        let actual = header.compute_crc16();
        if actual != header.crc16 {
            return Err(Error::HeaderCrcMismatch {
                expected: header.crc16,
                actual,
            });
        }

        if header.raw_size < 0 {
            return Err(Error::InvalidFrame(format!(
                "negative raw size {}",
                header.raw_size
            )));
        }

        let chunks = match header.method() {
            CompressionMethod::Stored => {
                let size = i32::try_from(header.raw_size).map_err(|_| {
                    Error::InvalidFrame(format!("stored frame of {} bytes", header.raw_size))
                })?;
                let payload = read_bytes(&mut reader, size as usize)?;
                vec![OodleChunk {
                    decompressed_size: size,
                    compressed_size: size,
                    payload,
                }]
            }
            CompressionMethod::Compressed => {
                if header.raw_size > 0 && header.seek_chunk_len <= 0 {
                    return Err(Error::InvalidFrame(format!(
                        "seek chunk length {}",
                        header.seek_chunk_len
                    )));
                }

                let count = header.chunk_count();
                let mut sizes = Vec::with_capacity(count.min(4096));
                for _ in 0..count {
                    let size = reader.read_i32::<LittleEndian>()?;
                    if size < 4 {
                        return Err(Error::InvalidFrame(format!("chunk size {size}")));
                    }
                    sizes.push(size);
                }

                let mut chunks = Vec::with_capacity(sizes.len());
                for compressed_size in sizes {
                    let decompressed_size = reader.read_i32::<LittleEndian>()?;
                    if decompressed_size < 0 {
                        return Err(Error::InvalidFrame(format!(
                            "chunk decompressed size {decompressed_size}"
                        )));
                    }
                    let payload = read_bytes(&mut reader, (compressed_size - 4) as usize)?;
                    chunks.push(OodleChunk {
                        decompressed_size,
                        compressed_size,
                        payload,
                    });
                }
                chunks
            }
        };

        debug!(
            raw_size = header.raw_size,
            chunks = chunks.len(),
            "read oodle frame"
        );

        Ok(OodleFile { header, chunks })
    }

    /// Restore the original data
    ///
    /// Stored frames are returned as they are. Compressed chunks are handed to `codec` in order and
    /// must expand to exactly the size they declare.
    #[instrument(skip_all, err)]
    pub fn decompress<C: OodleCodec + ?Sized>(&self, codec: &C) -> Result<Vec<u8>> {
        if self.header.method() == CompressionMethod::Stored {
            return Ok(self
                .chunks
                .first()
                .map(|chunk| chunk.payload.clone())
                .unwrap_or_default());
        }

        let mut output = Vec::with_capacity(self.header.raw_size.max(0) as usize);
        for (index, chunk) in self.chunks.iter().enumerate() {
            let expected = chunk.decompressed_size as usize;
            let data = codec.decompress(&chunk.payload, expected)?;
            if data.len() != expected {
                return Err(Error::ChunkSizeMismatch {
                    chunk: index,
                    expected,
                    actual: data.len(),
                });
            }
            output.extend_from_slice(&data);
        }

        Ok(output)
    }
}

/// Read a frame from `reader` and decompress it with `codec`
pub fn decompress<R: Read, C: OodleCodec + ?Sized>(reader: R, codec: &C) -> Result<Vec<u8>> {
    OodleFile::read(reader)?.decompress(codec)
}
