//! Types for reading ZFS archives
//!

use binrw::BinRead;
use byteorder::{LittleEndian, ReadBytesExt};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt::{self, Debug};
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use tracing::{debug, instrument, warn};

use crate::error::{Error, FileNotFoundError, Result};
use crate::types::{
    ContentHash, IndexEntry, ARCHIVE_MAGIC, CHUNK_MAGIC, INDEX_REGION_LEN, MAX_ENTRIES,
};

/// Structure representing a ZFS file entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZfsFileData {
    /// Hash naming the file
    pub hash: ContentHash,
    /// Specifies where the data of the file starts
    pub offset: u64,
    /// Size of the file in the archive
    pub compressed_size: u64,
    /// Checksum stored in the index
    pub crc16: u16,
    /// Whether the stored checksum matches the entry
    pub crc_valid: bool,
}

/// A struct for reading an entry from a ZFS archive
///
/// The data is returned as stored, normally an Oodle frame.
pub struct ZfsFile<'a, R: Read + Seek> {
    data: &'a ZfsFileData,
    reader: io::Take<&'a mut R>,
}

impl<R: Read + Seek> Debug for ZfsFile<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ZfsFile({:#?})", self.data)
    }
}

impl<R: Read + Seek> ZfsFile<'_, R> {
    /// Get the hash of the file
    pub fn hash(&self) -> ContentHash {
        self.data.hash
    }

    /// Get the size of the file, in bytes, in the archive
    pub fn compressed_size(&self) -> u64 {
        self.data.compressed_size
    }

    /// Get the starting offset of the data of the file
    pub fn data_start(&self) -> u64 {
        self.data.offset
    }

    /// Whether the index entry of the file passed its checksum
    pub fn crc_valid(&self) -> bool {
        self.data.crc_valid
    }
}

impl<R: Read + Seek> Read for ZfsFile<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

/// ZFS archive reader
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_zfs_contents(reader: impl Read + Seek) -> gujian_zfs::error::Result<()> {
///     let mut zfs = gujian_zfs::ZfsArchive::new(reader)?;
///
///     for i in 0..zfs.len() {
///         let file = zfs.by_index(i)?;
///         println!("{} {}", file.hash(), file.compressed_size());
///     }
///
///     Ok(())
/// }
/// ```
pub struct ZfsArchive<R> {
    reader: R,
    files: Vec<ZfsFileData>,
    by_hash: IndexMap<ContentHash, usize>,
}

impl<R: Read + Seek> ZfsArchive<R> {
    /// Read a ZFS archive collecting the files its index chunks list.
    #[instrument(skip_all, err)]
    pub fn new(mut reader: R) -> Result<ZfsArchive<R>> {
        reader.seek(SeekFrom::Start(0))?;
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != ARCHIVE_MAGIC {
            return Err(Error::BadMagic {
                what: "archive",
                found: magic,
            });
        }

        let mut files = Vec::new();
        let mut visited = HashSet::new();
        let mut chunk_offset = ARCHIVE_MAGIC.len() as u64;
        loop {
            if !visited.insert(chunk_offset) {
                return Err(Error::ChunkCycle(chunk_offset));
            }

            let next = Self::read_chunk(&mut reader, chunk_offset, &mut files)?;
            if next == 0 {
                break;
            }
            chunk_offset = next as u64;
        }

        let mut by_hash = IndexMap::with_capacity(files.len());
        for (index, file) in files.iter().enumerate() {
            by_hash.entry(file.hash).or_insert(index);
        }

        debug!(files = files.len(), chunks = visited.len(), "read zfs index");

        Ok(ZfsArchive {
            reader,
            files,
            by_hash,
        })
    }

    fn read_chunk(reader: &mut R, offset: u64, files: &mut Vec<ZfsFileData>) -> Result<u32> {
        reader.seek(SeekFrom::Start(offset))?;

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != CHUNK_MAGIC {
            return Err(Error::BadMagic {
                what: "index chunk",
                found: magic,
            });
        }

        let next = reader.read_u32::<LittleEndian>()?;

        let mut region = vec![0u8; INDEX_REGION_LEN];
        reader.read_exact(&mut region)?;
        let mut region = Cursor::new(region);

        for _ in 0..MAX_ENTRIES {
            let entry = IndexEntry::read(&mut region)?;
            if entry.is_empty() {
                continue;
            }

            let crc_valid = entry.compute_crc16() == entry.crc16;
            if !crc_valid {
                warn!(hash = %entry.hash, "index entry crc mismatch");
            }

            files.push(ZfsFileData {
                hash: entry.hash,
                offset: entry.file_offset as u64,
                compressed_size: entry.compressed_size as u64,
                crc16: entry.crc16,
                crc_valid,
            });
        }

        Ok(next)
    }

    /// Number of entries contained in this archive.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether this archive contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the hashes of all entries, in index order.
    pub fn hashes(&self) -> impl Iterator<Item = ContentHash> + '_ {
        self.files.iter().map(|f| f.hash)
    }

    /// Entries in index order
    pub fn entries(&self) -> &[ZfsFileData] {
        &self.files
    }

    /// Get the index of a file entry by hash, if it's present.
    #[inline(always)]
    pub fn index_for_hash(&self, hash: &ContentHash) -> Option<usize> {
        self.by_hash.get(hash).copied()
    }

    /// Search for a file entry by hash
    pub fn by_hash(&mut self, hash: &ContentHash) -> Result<ZfsFile<'_, R>> {
        let Some(index) = self.index_for_hash(hash) else {
            return Err(Error::FileNotFound(FileNotFoundError::Hash(*hash)));
        };
        self.by_index(index)
    }

    /// Get a contained file by index
    pub fn by_index(&mut self, file_number: usize) -> Result<ZfsFile<'_, R>> {
        let data = self
            .files
            .get(file_number)
            .ok_or(Error::FileNotFound(FileNotFoundError::Index(file_number)))?;

        self.reader.seek(SeekFrom::Start(data.offset))?;

        Ok(ZfsFile {
            data,
            reader: (&mut self.reader).take(data.compressed_size),
        })
    }

    /// Read the whole stored data of a file
    pub fn read_file(&mut self, file_number: usize) -> Result<Vec<u8>> {
        let mut file = self.by_index(file_number)?;
        let mut buffer = Vec::with_capacity(file.compressed_size() as usize);
        file.read_to_end(&mut buffer)?;
        if (buffer.len() as u64) < file.compressed_size() {
            return Err(Error::IOError(io::ErrorKind::UnexpectedEof.into()));
        }
        Ok(buffer)
    }

    /// Unwrap and return the inner reader object
    ///
    /// The position of the reader is undefined.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Read};
    use tracing_test::traced_test;

    use crate::error::{Error, Result};
    use crate::read::ZfsArchive;
    use crate::types::{ContentHash, IndexEntry, INDEX_REGION_LEN};

    fn archive_with(entries: &[IndexEntry], payload: &[u8]) -> Vec<u8> {
        let mut data = b"ZFS\0[IX]".to_vec();
        data.extend_from_slice(&[0, 0, 0, 0]);
        for entry in entries {
            data.extend_from_slice(&entry.hash.0);
            data.extend_from_slice(&entry.file_offset.to_le_bytes());
            data.extend_from_slice(&entry.compressed_size.to_le_bytes());
            data.extend_from_slice(&entry.crc16.to_le_bytes());
            data.extend_from_slice(&entry.reserved.to_le_bytes());
        }
        data.resize(12 + INDEX_REGION_LEN, 0);
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn read_invalid_magic() {
        let input = archive_with(&[], b"").into_iter().skip(1).collect::<Vec<_>>();

        assert!(matches!(
            ZfsArchive::new(Cursor::new(input)),
            Err(Error::BadMagic { what: "archive", .. })
        ));
    }

    #[test]
    fn read_invalid_chunk_magic() {
        let mut input = archive_with(&[], b"");
        input[5] = b'X';

        assert!(matches!(
            ZfsArchive::new(Cursor::new(input)),
            Err(Error::BadMagic {
                what: "index chunk",
                ..
            })
        ));
    }

    #[test]
    fn read_entry() -> Result<()> {
        let offset = (12 + INDEX_REGION_LEN) as u32;
        let hash = ContentHash::of(b"Hello World");
        let input = archive_with(&[IndexEntry::new(hash, offset, 11)], b"Hello World");

        let mut archive = ZfsArchive::new(Cursor::new(input))?;
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.index_for_hash(&hash), Some(0));

        let mut buffer = Vec::new();
        let mut file = archive.by_hash(&hash)?;
        assert_eq!(file.data_start(), offset as u64);
        assert!(file.crc_valid());
        file.read_to_end(&mut buffer)?;
        assert_eq!(buffer, b"Hello World");

        Ok(())
    }

    #[traced_test]
    #[test]
    fn crc_mismatch_is_reported() -> Result<()> {
        let offset = (12 + INDEX_REGION_LEN) as u32;
        let mut entry = IndexEntry::new(ContentHash::of(b"abc"), offset, 3);
        entry.crc16 ^= 0xFFFF;

        let archive = ZfsArchive::new(Cursor::new(archive_with(&[entry], b"abc")))?;
        assert_eq!(archive.len(), 1);
        assert!(!archive.entries()[0].crc_valid);
        assert!(logs_contain("index entry crc mismatch"));

        Ok(())
    }

    #[test]
    fn chunk_cycle() {
        let mut input = archive_with(&[], b"");
        // next chunk points back at the first one
        input[8..12].copy_from_slice(&4u32.to_le_bytes());

        assert!(matches!(
            ZfsArchive::new(Cursor::new(input)),
            Err(Error::ChunkCycle(4))
        ));
    }

    #[test]
    fn missing_file() -> Result<()> {
        let mut archive = ZfsArchive::new(Cursor::new(archive_with(&[], b"")))?;

        assert!(matches!(
            archive.by_index(0),
            Err(Error::FileNotFound(_))
        ));
        assert!(archive.by_hash(&ContentHash::default()).is_err());

        Ok(())
    }
}
