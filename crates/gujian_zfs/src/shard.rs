//! Building new data shards and persisting the name index
//!
//! A game install keeps its archives as `data000`, `data001`, ... next to each other. Builds
//! never touch an existing shard, they append a new one holding the staged content and rewrite
//! the name index.

use gujian_oodle::{CompressorOptions, OodleCodec, OodleFile};
use gujian_xxtea::{CipherKey, Xxtea};
use std::io::{Cursor, Seek, Write};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::names::NameIndex;
use crate::planner::StagedFile;
use crate::write::ZfsWriter;

const SHARD_PREFIX: &str = "data";

/// Whether `name` looks like `dataNNN`
pub fn is_shard_name(name: &str) -> bool {
    name.strip_prefix(SHARD_PREFIX)
        .is_some_and(|n| n.len() == 3 && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Name of the shard following the highest of `existing`
///
/// `data000` when there are none.
pub fn next_shard_name<S: AsRef<str>>(existing: &[S]) -> Result<String> {
    let mut names = existing.iter().map(AsRef::as_ref).collect::<Vec<_>>();
    names.sort_unstable();

    let Some(last) = names.last() else {
        return Ok(format!("{SHARD_PREFIX}000"));
    };

    let number = last
        .strip_prefix(SHARD_PREFIX)
        .and_then(|n| n.parse::<u32>().ok())
        .ok_or_else(|| Error::InvalidShardName(last.to_string()))?;

    Ok(format!("{SHARD_PREFIX}{:03}", number + 1))
}

/// Compress every staged file into an Oodle frame and write them as a new archive
#[instrument(skip_all, fields(files = staged.len()), err)]
pub fn write_shard<W: Write + Seek, C: OodleCodec + ?Sized>(
    staged: &[StagedFile],
    codec: &C,
    options: &CompressorOptions,
    writer: W,
) -> Result<W> {
    let mut zfs = ZfsWriter::new(writer);

    for file in staged {
        let frame = OodleFile::compress(&file.content, codec, options)?;
        zfs.start_file(file.hash)?;
        frame.write(&mut zfs)?;

        debug!(path = %file.path, hash = %file.hash, "stored");
    }

    zfs.finish()
}

/// Decode a name index file, an Oodle frame of the text form, encrypted when `key` is given
#[instrument(skip_all, fields(len = bytes.len()), err)]
pub fn load_name_index<C: OodleCodec + ?Sized>(
    bytes: &[u8],
    codec: &C,
    key: Option<&CipherKey>,
) -> Result<NameIndex> {
    let text = match key {
        Some(key) => {
            let mut buffer = bytes.to_vec();
            Xxtea::with_key(*key).decrypt(&mut buffer)?;
            gujian_oodle::decompress(Cursor::new(buffer), codec)?
        }
        None => gujian_oodle::decompress(Cursor::new(bytes), codec)?,
    };

    NameIndex::parse(&String::from_utf8(text)?)
}

/// Encode a name index file, the inverse of [`load_name_index`]
#[instrument(skip_all, fields(names = index.len()), err)]
pub fn save_name_index<C: OodleCodec + ?Sized>(
    index: &NameIndex,
    codec: &C,
    options: &CompressorOptions,
    key: Option<&CipherKey>,
) -> Result<Vec<u8>> {
    let mut bytes = OodleFile::compress(index.to_text().as_bytes(), codec, options)?.to_bytes()?;

    if let Some(key) = key {
        Xxtea::with_key(*key).encrypt(&mut bytes)?;
    }

    Ok(bytes)
}

#[cfg(test)]
mod test {
    use gujian_oodle::{CompressionLevel, CompressorOptions, Ooz};
    use gujian_xxtea::CipherKey;
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::names::NameIndex;
    use crate::shard::{is_shard_name, load_name_index, next_shard_name, save_name_index};
    use crate::types::ContentHash;

    #[test]
    fn shard_names() -> Result<()> {
        assert_eq!(next_shard_name::<&str>(&[])?, "data000");
        assert_eq!(next_shard_name(&["data001", "data009", "data000"])?, "data010");
        assert!(matches!(
            next_shard_name(&["index"]),
            Err(Error::InvalidShardName(_))
        ));

        assert!(is_shard_name("data042"));
        assert!(!is_shard_name("data42"));
        assert!(!is_shard_name("data04x"));

        Ok(())
    }

    #[test]
    fn name_index_file() -> Result<()> {
        let mut index = NameIndex::new();
        index.insert("a.txt", ContentHash::of(b"a"));
        index.insert("dir/b.txt", ContentHash::of(b"b"));

        let options = CompressorOptions::builder()
            .level(CompressionLevel::None)
            .timestamp(0)
            .build();

        let plain = save_name_index(&index, &Ooz, &options, None)?;
        assert_eq!(load_name_index(&plain, &Ooz, None)?, index);

        let key = CipherKey::from_secret("0123456789abcdef")?;
        let encrypted = save_name_index(&index, &Ooz, &options, Some(&key))?;
        assert_ne!(encrypted, plain);
        assert_eq!(load_name_index(&encrypted, &Ooz, Some(&key))?, index);

        Ok(())
    }
}
