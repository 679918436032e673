use clap::Args;
use gujian_gamedata::StringTable;
use miette::{Context, IntoDiagnostic, Result};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

use crate::commands::create_output;
use crate::commands::gamedata::{read_document, read_json};

#[derive(Args)]
pub struct ExtractTextArgs {
    /// An input document
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// A target JSON file, `INPUT.json` by default
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExtractTextArgs {
    pub fn handle(&self) -> Result<()> {
        let (_, strings) = read_document(&self.input, None)?;

        let output = self.output.clone().unwrap_or_else(|| {
            let mut output = self.input.clone().into_os_string();
            output.push(".json");
            PathBuf::from(output)
        });

        info!("writing {}", output.display());
        let mut out = BufWriter::new(create_output(&output, self.overwrite)?);
        serde_json::to_writer_pretty(&mut out, &strings)
            .into_diagnostic()
            .context(format!("writing {}", output.display()))?;
        out.flush().into_diagnostic()?;

        Ok(())
    }
}

#[derive(Args)]
pub struct BuildTextArgs {
    /// The original document
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// A JSON `path -> string` map of translations
    #[arg(value_name = "TRANSLATIONS")]
    translations: PathBuf,

    /// A target document
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl BuildTextArgs {
    pub fn handle(&self) -> Result<()> {
        let translations: StringTable = read_json(&self.translations)?;
        info!("{} translations", translations.len());

        let (document, _) = read_document(&self.input, Some(translations))?;

        info!("writing {}", self.output.display());
        let mut out = BufWriter::new(create_output(&self.output, self.overwrite)?);
        document
            .write(&mut out)
            .context(format!("encoding {}", self.output.display()))?;
        out.flush().into_diagnostic()?;

        Ok(())
    }
}
