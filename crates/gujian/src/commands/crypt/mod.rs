use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

use crate::commands::{create_output, open_input, KeyArgs};

#[derive(clap::Subcommand)]
pub enum CryptCommands {
    /// Decrypt a protected file
    Decrypt(CryptArgs),
    /// Encrypt a file so the game can read it
    Encrypt(CryptArgs),
}

impl CryptCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            CryptCommands::Decrypt(args) => args.decrypt(),
            CryptCommands::Encrypt(args) => args.encrypt(),
        }
    }
}

#[derive(Args)]
pub struct CryptArgs {
    /// An input file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// A target file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    keys: KeyArgs,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl CryptArgs {
    fn decrypt(&self) -> Result<()> {
        // Per-file keys are found by the path of the protected file
        let cipher = self.keys.cipher(&self.input)?;
        info!("decrypting {}", self.input.display());

        let input = BufReader::new(open_input(&self.input)?);
        let mut output = BufWriter::new(create_output(&self.output, self.overwrite)?);
        let size = cipher.decrypt_stream(input, &mut output)?;
        output
            .flush()
            .into_diagnostic()
            .context(format!("writing {}", self.output.display()))?;

        info!("wrote {size} bytes to {}", self.output.display());
        Ok(())
    }

    fn encrypt(&self) -> Result<()> {
        let cipher = self.keys.cipher(&self.output)?;
        info!("encrypting {}", self.input.display());

        let input = BufReader::new(open_input(&self.input)?);
        let mut output = BufWriter::new(create_output(&self.output, self.overwrite)?);
        let size = cipher.encrypt_stream(input, &mut output)?;
        output
            .flush()
            .into_diagnostic()
            .context(format!("writing {}", self.output.display()))?;

        info!("wrote {size} bytes to {}", self.output.display());
        Ok(())
    }
}
