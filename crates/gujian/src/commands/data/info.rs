use clap::Args;
use miette::Result;
use std::io::BufReader;
use std::path::PathBuf;

use crate::commands::data::{data_directory, load_index, shard_paths};
use crate::commands::{open_input, CodecArgs};
use gujian_zfs::ZfsArchive;

#[derive(Args)]
pub struct InfoArgs {
    /// The name index, one directory below the shards
    #[arg(short, long, value_name = "FILE")]
    index: PathBuf,

    #[command(flatten)]
    codec: CodecArgs,
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let codec = self.codec.codec()?;
        let names = load_index(&self.index, codec.as_ref())?;

        for shard in shard_paths(&data_directory(&self.index)?)? {
            let zfs = ZfsArchive::new(BufReader::new(open_input(&shard)?))?;
            let shard_name = shard
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            for entry in zfs.entries() {
                let Some(files) = names.names_for(&entry.hash) else {
                    continue;
                };

                for file in files {
                    println!(
                        "{file}\t{}\t{shard_name}\t0x{:08X}\t{}",
                        entry.hash, entry.offset, entry.compressed_size
                    );
                }
            }
        }

        Ok(())
    }
}
