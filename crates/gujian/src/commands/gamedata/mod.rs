use gujian_gamedata::{GameData, GameDataReader, StringTable};
use miette::{Context, IntoDiagnostic, Result};
use std::io::BufReader;
use std::path::Path;
use tracing::info;

use crate::commands::open_input;

pub mod json;
pub mod text;

#[derive(clap::Subcommand)]
pub enum GameDataCommands {
    /// Dump a document as JSON
    ExtractJson(json::ExtractJsonArgs),
    /// Build a document from its JSON dump
    BuildJson(json::BuildJsonArgs),
    /// Dump the strings of a document as a JSON `path -> string` map
    ExtractText(text::ExtractTextArgs),
    /// Rebuild a document with translated strings
    BuildText(text::BuildTextArgs),
}

impl GameDataCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            GameDataCommands::ExtractJson(args) => args.handle(),
            GameDataCommands::BuildJson(args) => args.handle(),
            GameDataCommands::ExtractText(args) => args.handle(),
            GameDataCommands::BuildText(args) => args.handle(),
        }
    }
}

pub(crate) fn read_document(
    path: &Path,
    translations: Option<StringTable>,
) -> Result<(GameData, StringTable)> {
    info!("reading {}", path.display());

    let mut reader = GameDataReader::new();
    if let Some(translations) = translations {
        reader = reader.with_translations(translations);
    }

    let (document, strings) = reader
        .read(BufReader::new(open_input(path)?))
        .context(format!("decoding {}", path.display()))?;

    info!("{} strings", strings.len());
    Ok((document, strings))
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    serde_json::from_reader(BufReader::new(open_input(path)?))
        .into_diagnostic()
        .context(format!("parsing {}", path.display()))
}
