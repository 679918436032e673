use clap::Args;
use miette::{miette, Result};
use std::collections::HashSet;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;

use crate::commands::data::{extract_archive, load_index};
use crate::commands::{open_input, CodecArgs};
use gujian_zfs::ZfsArchive;

#[derive(Args)]
pub struct ExtractSingleArgs {
    /// An input shard
    #[arg(short, long, value_name = "FILE")]
    archive: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// A name index; without it every file is written under its hash
    #[arg(short, long, value_name = "FILE")]
    index: Option<PathBuf>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    #[command(flatten)]
    codec: CodecArgs,
}

impl ExtractSingleArgs {
    pub fn handle(&self) -> Result<()> {
        let codec = self.codec.codec()?;
        let names = match &self.index {
            Some(index) => Some(load_index(index, codec.as_ref())?),
            None => None,
        };

        info!("loading {}", self.archive.display());
        let mut zfs = ZfsArchive::new(BufReader::new(open_input(&self.archive)?))?;

        let failures = extract_archive(
            &mut zfs,
            codec.as_ref(),
            names.as_ref(),
            true,
            &self.output,
            self.overwrite,
            &mut HashSet::new(),
        );

        if failures > 0 {
            return Err(miette!("{failures} files could not be extracted"));
        }
        Ok(())
    }
}
