use clap::{Args, ValueEnum};
use gujian_oodle::{CompressionLevel, OodleCodec, Ooz};
use gujian_xxtea::{CipherKey, KeyTable, Xxtea};
use miette::{Context, IntoDiagnostic, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub mod crypt;
pub mod data;
pub mod gamedata;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle the data shards and their name index
    Data {
        #[command(subcommand)]
        command: data::DataCommands,
    },
    /// Decrypt and encrypt protected files
    Crypt {
        #[command(subcommand)]
        command: crypt::CryptCommands,
    },
    /// Convert GameData documents
    Gamedata {
        #[command(subcommand)]
        command: gamedata::GameDataCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Data { command } => command.handle(),
            Commands::Crypt { command } => command.handle(),
            Commands::Gamedata { command } => command.handle(),
        }
    }
}

/// Selects the Oodle codec
#[derive(Args)]
pub struct CodecArgs {
    /// The native Oodle library, needed to compress
    #[cfg(feature = "native")]
    #[arg(long, value_name = "FILE", env = "GUJIAN_OODLE_LIB")]
    oodle_lib: Option<PathBuf>,
}

impl CodecArgs {
    pub fn codec(&self) -> Result<Box<dyn OodleCodec>> {
        #[cfg(feature = "native")]
        if let Some(path) = &self.oodle_lib {
            let codec = gujian_oodle::NativeOodle::load(path)
                .context(format!("loading {}", path.display()))?;
            return Ok(Box::new(codec));
        }

        Ok(Box::new(Ooz))
    }
}

/// Selects the cipher key
#[derive(Args)]
pub struct KeyArgs {
    /// A secret whose first 16 characters are the key
    #[arg(short, long)]
    key: Option<String>,

    /// A table of `suffix<TAB>key` lines replacing the game's own keys, searched by file path
    /// when no secret is given
    #[arg(long, value_name = "FILE", env = "GUJIAN_KEYS")]
    keys: Option<PathBuf>,
}

impl KeyArgs {
    /// The cipher for the game file at `path`, failing when no key applies to it
    pub fn cipher(&self, path: &Path) -> Result<Xxtea> {
        if let Some(secret) = &self.key {
            return Ok(Xxtea::with_key(CipherKey::from_secret(secret)?));
        }

        let table = match &self.keys {
            Some(keys) => {
                let text = fs::read_to_string(keys)
                    .into_diagnostic()
                    .context(format!("reading {}", keys.display()))?;
                KeyTable::parse(&text).context(format!("parsing {}", keys.display()))?
            }
            None => KeyTable::game()?,
        };

        let cipher = Xxtea::for_path(&table, &path.to_string_lossy());
        if cipher.key().is_none() {
            return Err(gujian_xxtea::error::Error::UninitializedKey)
                .context(format!("no key for {}", path.display()));
        }

        Ok(cipher)
    }
}

/// Oodle compression levels
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum Level {
    /// Store without compressing
    None,
    SuperFast,
    VeryFast,
    Fast,
    Normal,
    Optimal1,
    Optimal2,
    #[default]
    Optimal3,
    Optimal4,
    Optimal5,
}

impl From<Level> for CompressionLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::None => CompressionLevel::None,
            Level::SuperFast => CompressionLevel::SuperFast,
            Level::VeryFast => CompressionLevel::VeryFast,
            Level::Fast => CompressionLevel::Fast,
            Level::Normal => CompressionLevel::Normal,
            Level::Optimal1 => CompressionLevel::Optimal1,
            Level::Optimal2 => CompressionLevel::Optimal2,
            Level::Optimal3 => CompressionLevel::Optimal3,
            Level::Optimal4 => CompressionLevel::Optimal4,
            Level::Optimal5 => CompressionLevel::Optimal5,
        }
    }
}

/// Create `path`, refusing to replace an existing file unless `overwrite` is set
pub(crate) fn create_output(path: &Path, overwrite: bool) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .into_diagnostic()
            .context(format!("creating {}", parent.display()))?;
    }

    if !overwrite {
        File::create_new(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    } else {
        File::create(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    }
}

pub(crate) fn open_input(path: &Path) -> Result<File> {
    File::open(path)
        .into_diagnostic()
        .context(format!("path: {}", path.display()))
}
