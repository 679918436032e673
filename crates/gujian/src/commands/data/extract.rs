use clap::Args;
use miette::{miette, Result};
use std::collections::HashSet;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;

use crate::commands::data::{data_directory, extract_archive, load_index, shard_paths};
use crate::commands::{open_input, CodecArgs};
use gujian_zfs::ZfsArchive;

#[derive(Args)]
pub struct ExtractArgs {
    /// The name index, one directory below the shards
    #[arg(short, long, value_name = "FILE")]
    index: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    #[command(flatten)]
    codec: CodecArgs,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let codec = self.codec.codec()?;
        let names = load_index(&self.index, codec.as_ref())?;

        // The same content can be stored in more than one shard
        let mut extracted = HashSet::new();
        let mut failures = 0;
        for shard in shard_paths(&data_directory(&self.index)?)? {
            info!("loading {}", shard.display());

            let mut zfs = ZfsArchive::new(BufReader::new(open_input(&shard)?))?;
            failures += extract_archive(
                &mut zfs,
                codec.as_ref(),
                Some(&names),
                false,
                &self.output,
                self.overwrite,
                &mut extracted,
            );
        }

        if failures > 0 {
            return Err(miette!("{failures} files could not be extracted"));
        }
        Ok(())
    }
}
