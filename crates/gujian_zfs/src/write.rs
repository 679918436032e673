//! Types for writing ZFS archives
//!

use binrw::BinWrite;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Cursor, Seek, SeekFrom, Write};
use tracing::{debug, instrument, Level};

use crate::error::{Error, Result};
use crate::types::{
    ContentHash, IndexEntry, ARCHIVE_MAGIC, CHUNK_HEADER_LEN, CHUNK_MAGIC, INDEX_REGION_LEN,
    MAX_ENTRIES,
};

/// ZFS archive generator
///
/// Files are laid out as they are written. Every 4096 files a new index chunk is started.
///
/// ```
/// # fn doit() -> gujian_zfs::error::Result<()>
/// # {
/// use std::io::Write;
/// use gujian_zfs::{ContentHash, ZfsWriter};
///
/// // We use a buffer here, though you'd normally use a `File`
/// let mut zfs = ZfsWriter::new(std::io::Cursor::new(Vec::new()));
///
/// let data = b"Hello, World!";
/// zfs.start_file(ContentHash::of(data))?;
/// zfs.write_all(data)?;
///
/// // Apply the changes you've made.
/// zfs.finish()?;
///
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct ZfsWriter<W: Write + Seek> {
    inner: W,
    started: bool,
    writing_to_file: bool,
    chunk_start: u64,
    position: u64,
    entries: Vec<IndexEntry>,
    chunks: usize,
}

impl<W: Write + Seek> ZfsWriter<W> {
    /// Initializes the archive.
    ///
    /// Before writing to this object, the [`ZfsWriter::start_file`] function should be called.
    pub fn new(inner: W) -> ZfsWriter<W> {
        ZfsWriter {
            inner,
            started: false,
            writing_to_file: false,
            chunk_start: 0,
            position: 0,
            entries: Vec::with_capacity(MAX_ENTRIES),
            chunks: 0,
        }
    }

    /// Returns true if a file is currently open for writing.
    pub const fn is_writing_file(&self) -> bool {
        self.writing_to_file
    }

    fn ensure_started(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }

        self.inner.seek(SeekFrom::Start(0))?;
        self.inner.write_all(&ARCHIVE_MAGIC)?;
        self.position = ARCHIVE_MAGIC.len() as u64;
        self.started = true;
        self.open_chunk()
    }

    fn open_chunk(&mut self) -> Result<()> {
        self.chunk_start = self.position;
        self.entries.clear();
        self.chunks += 1;

        // Placeholder header and empty slots, filled in when the chunk is closed
        self.inner.write_all(&CHUNK_MAGIC)?;
        self.inner.write_u32::<LittleEndian>(0)?;
        self.inner.write_all(&[0u8; INDEX_REGION_LEN])?;
        self.position += (CHUNK_HEADER_LEN + INDEX_REGION_LEN) as u64;

        Ok(())
    }

    #[instrument(skip(self), err)]
    fn close_chunk(&mut self, next: u32) -> Result<()> {
        let mut header = Cursor::new(Vec::with_capacity(CHUNK_HEADER_LEN + INDEX_REGION_LEN));
        header.write_all(&CHUNK_MAGIC)?;
        header.write_u32::<LittleEndian>(next)?;
        for entry in &self.entries {
            IndexEntry::new(entry.hash, entry.file_offset, entry.compressed_size)
                .write(&mut header)?;
        }

        self.inner.seek(SeekFrom::Start(self.chunk_start))?;
        self.inner.write_all(header.get_ref())?;
        self.inner.seek(SeekFrom::Start(self.position))?;

        debug!(entries = self.entries.len(), next, "closed index chunk");

        Ok(())
    }

    fn offset(&self) -> Result<u32> {
        u32::try_from(self.position).map_err(|_| Error::OffsetOverflow(self.position))
    }

    /// Start a new file named by `hash`
    #[instrument(skip(self), err)]
    pub fn start_file(&mut self, hash: ContentHash) -> Result<()> {
        self.ensure_started()?;
        self.writing_to_file = false;

        if self.entries.len() == MAX_ENTRIES {
            let next = self.offset()?;
            self.close_chunk(next)?;
            self.open_chunk()?;
        }

        let file_offset = self.offset()?;
        self.entries.push(IndexEntry::new(hash, file_offset, 0));
        self.writing_to_file = true;

        Ok(())
    }

    /// Add a whole file
    pub fn add_file(&mut self, hash: ContentHash, data: &[u8]) -> Result<()> {
        self.start_file(hash)?;
        self.write_all(data)?;
        Ok(())
    }

    /// Write the index of the last chunk and return the inner writer
    #[instrument(skip(self), err)]
    pub fn finish(mut self) -> Result<W> {
        self.ensure_started()?;
        self.close_chunk(0)?;
        self.inner.flush()?;

        debug!(chunks = self.chunks, size = self.position, "finished zfs archive");

        Ok(self.inner)
    }
}

impl<W: Write + Seek> Write for ZfsWriter<W> {
    #[instrument(skip_all, err, ret(level = Level::TRACE), fields(size=buf.len()) )]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.writing_to_file {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                Error::NoFileStarted.to_string(),
            ));
        }

        let end = self.position + buf.len() as u64;
        let compressed_size = end - self.entries.last().map_or(end, |e| e.file_offset as u64);
        let compressed_size = u32::try_from(compressed_size)
            .map_err(|_| io::Error::new(io::ErrorKind::Other, Error::OffsetOverflow(end).to_string()))?;

        let written = self.inner.write(buf)?;
        self.position += written as u64;

        if let Some(entry) = self.entries.last_mut() {
            entry.compressed_size = compressed_size - (buf.len() - written) as u32;
        }

        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};
    use tracing_test::traced_test;

    use crate::error::Result;
    use crate::types::{ContentHash, INDEX_REGION_LEN};
    use crate::write::ZfsWriter;

    #[traced_test]
    #[test]
    fn empty_archive_has_one_chunk() -> Result<()> {
        let result = ZfsWriter::new(Cursor::new(Vec::new())).finish()?.into_inner();

        assert_eq!(result.len(), 12 + INDEX_REGION_LEN);
        assert_eq!(result[..12], *b"ZFS\0[IX]\0\0\0\0");
        assert!(result[12..].iter().all(|b| *b == 0));

        Ok(())
    }

    #[test]
    fn write_single_file() -> Result<()> {
        let hash = ContentHash::of(b"Hello World");

        let mut zfs = ZfsWriter::new(Cursor::new(Vec::new()));
        zfs.start_file(hash)?;
        zfs.write_all(b"Hello ")?;
        zfs.write_all(b"World")?;
        let result = zfs.finish()?.into_inner();

        let data_start = 12 + INDEX_REGION_LEN;
        assert_eq!(result.len(), data_start + 11);
        assert_eq!(result[12..32], hash.0);
        assert_eq!(result[32..36], (data_start as u32).to_le_bytes());
        assert_eq!(result[36..40], 11u32.to_le_bytes());
        assert_eq!(result[42..44], [0x00, 0x01]);
        assert_eq!(result[data_start..], *b"Hello World");

        Ok(())
    }

    #[test]
    fn write_without_file() {
        let mut zfs = ZfsWriter::new(Cursor::new(Vec::new()));
        assert!(zfs.write_all(b"data").is_err());
    }
}
