use gujian_oodle::error::{Error, Result};
use gujian_oodle::{CompressionLevel, Compressor, CompressorOptions, OodleCodec, OodleFile};
use pretty_assertions::assert_eq;
use std::io::Cursor;
use tracing_test::traced_test;

const SEEK_CHUNK_LEN: i32 = 0x100;

/// Scrambles every byte so payloads are distinguishable from the raw data
struct XorCodec;

impl OodleCodec for XorCodec {
    fn compress(
        &self,
        data: &[u8],
        _compressor: Compressor,
        _level: CompressionLevel,
        _seek_chunk_len: i32,
    ) -> Result<Vec<u8>> {
        Ok(data.iter().map(|b| b ^ 0x5A).collect())
    }

    fn decompress(&self, data: &[u8], _decompressed_len: usize) -> Result<Vec<u8>> {
        Ok(data.iter().map(|b| b ^ 0x5A).collect())
    }

    fn seek_chunk_len(&self, _raw_size: i64) -> i32 {
        SEEK_CHUNK_LEN
    }
}

/// Drops the last byte of every chunk it decompresses
struct ShortCodec;

impl OodleCodec for ShortCodec {
    fn compress(
        &self,
        data: &[u8],
        compressor: Compressor,
        level: CompressionLevel,
        seek_chunk_len: i32,
    ) -> Result<Vec<u8>> {
        XorCodec.compress(data, compressor, level, seek_chunk_len)
    }

    fn decompress(&self, data: &[u8], decompressed_len: usize) -> Result<Vec<u8>> {
        let mut output = XorCodec.decompress(data, decompressed_len)?;
        output.pop();
        Ok(output)
    }

    fn seek_chunk_len(&self, raw_size: i64) -> i32 {
        XorCodec.seek_chunk_len(raw_size)
    }
}

fn sample(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + 3) as u8).collect()
}

fn compressed_options() -> CompressorOptions {
    CompressorOptions::builder()
        .compressor(Compressor::Kraken)
        .level(CompressionLevel::Optimal3)
        .timestamp(1_600_000_000)
        .build()
}

#[traced_test]
#[test]
fn compressed_frame_round_trip() -> Result<()> {
    let data = sample(0x100 * 3 + 17);

    let file = OodleFile::compress(&data, &XorCodec, &compressed_options())?;
    assert_eq!(file.header.compression, 4);
    assert_eq!(file.chunks.len(), 4);
    assert_eq!(file.chunks[3].decompressed_size, 17);

    // header plus, per chunk, its table entry, its size prefix and its payload
    let expected_size = 0x20 + 4 * 4 + 4 * 4 + data.len() as i64;
    assert_eq!(file.header.compressed_size, expected_size);

    let bytes = file.to_bytes()?;
    assert_eq!(bytes.len() as i64, expected_size);

    let parsed = OodleFile::read(Cursor::new(&bytes))?;
    assert_eq!(parsed, file);
    assert_eq!(parsed.decompress(&XorCodec)?, data);

    Ok(())
}

#[test]
fn chunk_count_follows_seek_chunk_len() -> Result<()> {
    for (len, chunks) in [(0, 0), (1, 1), (0x100, 1), (0x101, 2), (0x1000, 16)] {
        let file = OodleFile::compress(&sample(len), &XorCodec, &compressed_options())?;
        assert_eq!(file.chunks.len(), chunks, "length {len}");

        let parsed = OodleFile::read(Cursor::new(file.to_bytes()?))?;
        assert_eq!(parsed.decompress(&XorCodec)?.len(), len);
    }

    Ok(())
}

#[test]
fn stored_frame_returns_exact_size() -> Result<()> {
    let options = CompressorOptions::builder()
        .level(CompressionLevel::None)
        .build();

    for len in [0, 1, 255, 0x1234] {
        let data = sample(len);
        let mut bytes = Vec::new();
        gujian_oodle::compress(&data, &XorCodec, &options, &mut bytes)?;
        assert_eq!(bytes.len(), 0x20 + len);

        let restored = gujian_oodle::decompress(Cursor::new(&bytes), &XorCodec)?;
        assert_eq!(restored, data);
    }

    Ok(())
}

#[test]
fn short_chunk_is_an_error() -> Result<()> {
    let data = sample(0x180);
    let bytes = OodleFile::compress(&data, &ShortCodec, &compressed_options())?.to_bytes()?;

    match gujian_oodle::decompress(Cursor::new(&bytes), &ShortCodec) {
        Err(Error::ChunkSizeMismatch {
            chunk,
            expected,
            actual,
        }) => {
            assert_eq!(chunk, 0);
            assert_eq!(expected, 0x100);
            assert_eq!(actual, 0xFF);
        }
        other => panic!("unexpected result {other:?}"),
    }

    Ok(())
}

#[test]
fn header_crc_mismatch() -> Result<()> {
    let mut bytes = OodleFile::compress(&sample(64), &XorCodec, &compressed_options())?.to_bytes()?;
    bytes[0] ^= 0xFF;

    assert!(matches!(
        OodleFile::read(Cursor::new(&bytes)),
        Err(Error::HeaderCrcMismatch { .. })
    ));

    Ok(())
}
