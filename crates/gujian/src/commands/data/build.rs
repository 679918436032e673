use clap::Args;
use gujian_oodle::{CompressionLevel, CompressorOptions};
use gujian_zfs::{next_shard_name, save_name_index, write_shard, BuildPlanner, PlanAction};
use miette::{miette, Context, IntoDiagnostic, Result};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{error, info};
use walkdir::WalkDir;

use crate::commands::data::{data_directory, load_index, shard_paths};
use crate::commands::{CodecArgs, Level};

#[derive(Args)]
pub struct BuildArgs {
    /// The name index, one directory below the shards
    #[arg(short, long, value_name = "FILE")]
    index: PathBuf,

    /// An input directory laid out like the game's files
    #[arg(short = 'd', long, value_name = "DIR")]
    input: PathBuf,

    /// Compression level of the new shard and the index
    #[arg(long, value_enum, default_value_t = Level::default())]
    level: Level,

    #[command(flatten)]
    codec: CodecArgs,
}

impl BuildArgs {
    pub fn handle(&self) -> Result<()> {
        let codec = self.codec.codec()?;
        let options = CompressorOptions::builder()
            .level(CompressionLevel::from(self.level))
            .build();

        let mut backup = self.index.clone().into_os_string();
        backup.push(".backup");
        let backup = PathBuf::from(backup);
        if backup.exists() {
            info!("backup {} already exists, skipping", backup.display());
        } else {
            info!("backing up {} to {}", self.index.display(), backup.display());
            fs::copy(&self.index, &backup)
                .into_diagnostic()
                .context(format!("creating {}", backup.display()))?;
        }

        let mut names = load_index(&self.index, codec.as_ref())?;
        let directory = data_directory(&self.index)?;
        let shards = shard_paths(&directory)?
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_owned))
            .collect::<Vec<_>>();
        let shard = directory.join(next_shard_name(&shards)?);

        let files = WalkDir::new(&self.input)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_type().is_dir())
            .collect::<Vec<_>>();

        let mut planner = BuildPlanner::new(&mut names);
        let mut failures = 0;
        for file in files {
            let name = file.path().strip_prefix(&self.input).into_diagnostic()?;
            let Some(name) = name.to_str().map(|n| n.replace('\\', "/")) else {
                error!("unable to convert {} to a string", name.display());
                failures += 1;
                continue;
            };

            let content = match fs::read(file.path()) {
                Ok(content) => content,
                Err(err) => {
                    error!("reading {}: {err}", file.path().display());
                    failures += 1;
                    continue;
                }
            };

            if planner.process_content(&name, content) == PlanAction::Unchanged {
                info!("skipping {name}");
            }
        }

        let staged = planner.into_staged();
        if !staged.is_empty() {
            info!("creating {} with {} files", shard.display(), staged.len());

            let out = File::create_new(&shard)
                .into_diagnostic()
                .context(format!("creating {}", shard.display()))?;
            write_shard(&staged, codec.as_ref(), &options, BufWriter::new(out))
                .context(format!("writing {}", shard.display()))?;
        } else {
            info!("nothing changed, no shard written");
        }

        info!("updating {}", self.index.display());
        let bytes = save_name_index(&names, codec.as_ref(), &options, None)?;
        fs::write(&self.index, bytes)
            .into_diagnostic()
            .context(format!("writing {}", self.index.display()))?;

        if failures > 0 {
            return Err(miette!("{failures} files could not be added"));
        }
        Ok(())
    }
}
