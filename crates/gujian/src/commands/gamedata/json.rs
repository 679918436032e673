use clap::Args;
use gujian_gamedata::GameData;
use miette::{Context, IntoDiagnostic, Result};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

use crate::commands::create_output;
use crate::commands::gamedata::{read_document, read_json};

#[derive(Args)]
pub struct ExtractJsonArgs {
    /// An input document
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// A target JSON file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExtractJsonArgs {
    pub fn handle(&self) -> Result<()> {
        let (document, _) = read_document(&self.input, None)?;

        info!("writing {}", self.output.display());
        let mut out = BufWriter::new(create_output(&self.output, self.overwrite)?);
        serde_json::to_writer_pretty(&mut out, &document)
            .into_diagnostic()
            .context(format!("writing {}", self.output.display()))?;
        out.flush().into_diagnostic()?;

        Ok(())
    }
}

#[derive(Args)]
pub struct BuildJsonArgs {
    /// An input JSON file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// A target document
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl BuildJsonArgs {
    pub fn handle(&self) -> Result<()> {
        info!("reading {}", self.input.display());
        let document: GameData = read_json(&self.input)?;

        info!("writing {}", self.output.display());
        let mut out = BufWriter::new(create_output(&self.output, self.overwrite)?);
        document
            .write(&mut out)
            .context(format!("encoding {}", self.output.display()))?;
        out.flush().into_diagnostic()?;

        Ok(())
    }
}
