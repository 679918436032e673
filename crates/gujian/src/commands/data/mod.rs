use gujian_oodle::OodleCodec;
use gujian_zfs::{is_shard_name, load_name_index, ContentHash, NameIndex, ZfsArchive};
use miette::{miette, Context, IntoDiagnostic, Result};
use std::collections::HashSet;
use std::fs;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::commands::create_output;

pub mod build;
pub mod extract;
pub mod extract_single;
pub mod info;

#[derive(clap::Subcommand)]
pub enum DataCommands {
    /// Extract every shard named by an index into a directory
    Extract(extract::ExtractArgs),
    /// Extract a single shard into a directory
    ExtractSingle(extract_single::ExtractSingleArgs),
    /// List where every named file is stored
    Info(info::InfoArgs),
    /// Add the changed files of a directory as a new shard
    Build(build::BuildArgs),
}

impl DataCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            DataCommands::Extract(extract) => extract.handle(),
            DataCommands::ExtractSingle(extract) => extract.handle(),
            DataCommands::Info(info) => info.handle(),
            DataCommands::Build(build) => build.handle(),
        }
    }
}

/// The shards live one directory above the name index
pub(crate) fn data_directory(index: &Path) -> Result<PathBuf> {
    let index = fs::canonicalize(index)
        .into_diagnostic()
        .context(format!("path: {}", index.display()))?;

    index
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .ok_or(miette!("unable to find the data directory of {}", index.display()))
}

/// The `dataNNN` files of `directory`, sorted by name
pub(crate) fn shard_paths(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut shards = fs::read_dir(directory)
        .into_diagnostic()
        .context(format!("reading {}", directory.display()))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
        .filter(|e| e.file_name().to_str().is_some_and(is_shard_name))
        .map(|e| e.path())
        .collect::<Vec<_>>();
    shards.sort();

    Ok(shards)
}

pub(crate) fn load_index(path: &Path, codec: &dyn OodleCodec) -> Result<NameIndex> {
    info!("loading index {}", path.display());

    let bytes = fs::read(path)
        .into_diagnostic()
        .context(format!("reading {}", path.display()))?;
    let index = load_name_index(&bytes, codec, None)
        .context(format!("decoding {}", path.display()))?;

    info!("{} names", index.len());
    Ok(index)
}

/// Decompress the entries of an archive into `output`
///
/// Entries are written under every name `names` has for them. Entries without a name are
/// written under their hash when there is no index or `unknown` is set, and skipped otherwise.
/// Hashes in `extracted` were written from an earlier shard and are skipped, the ones written
/// here are added to it. Returns the number of entries that failed.
pub(crate) fn extract_archive<R: Read + Seek>(
    zfs: &mut ZfsArchive<R>,
    codec: &dyn OodleCodec,
    names: Option<&NameIndex>,
    unknown: bool,
    output: &Path,
    overwrite: bool,
    extracted: &mut HashSet<ContentHash>,
) -> usize {
    let mut failures = 0;

    for i in 0..zfs.len() {
        let hash = zfs.entries()[i].hash;
        if extracted.contains(&hash) {
            debug!(%hash, "already extracted");
            continue;
        }

        let targets = match names.and_then(|n| n.names_for(&hash)) {
            Some(names) => names.iter().cloned().collect::<Vec<_>>(),
            None if names.is_none() || unknown => vec![hash.to_string()],
            None => continue,
        };
        if targets.is_empty() {
            continue;
        }

        match extract_entry(zfs, i, codec, &targets, output, overwrite) {
            Ok(()) => {
                extracted.insert(hash);
            }
            Err(err) => {
                error!("{hash}: {err:?}");
                failures += 1;
            }
        }
    }

    failures
}

fn extract_entry<R: Read + Seek>(
    zfs: &mut ZfsArchive<R>,
    index: usize,
    codec: &dyn OodleCodec,
    targets: &[String],
    output: &Path,
    overwrite: bool,
) -> Result<()> {
    let frame = zfs.read_file(index)?;
    let data = gujian_oodle::decompress(frame.as_slice(), codec)?;

    for target in targets {
        let p = output.join(target);
        info!("writing {}", p.display());

        let mut out = create_output(&p, overwrite)?;
        out.write_all(&data)
            .into_diagnostic()
            .context(format!("writing {}", p.display()))?;
    }

    Ok(())
}
