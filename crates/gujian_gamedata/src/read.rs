//! Types for reading GameData documents
//!

use byteorder::{LittleEndian, ReadBytesExt};
use indexmap::IndexMap;
use std::io::{Read, Seek};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::types::{tag, GameData, GameDataValue, ObjectMap, StringTable, MAGICS};

/// GameData document reader
///
/// Every string leaf that is not a map key is recorded in a [`StringTable`] under its path. The
/// root has the empty path, child `i` of a map at `p` lives at `p/i` and the value of key `k`
/// lives at `p/k`.
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_strings(reader: impl Read + Seek) -> gujian_gamedata::error::Result<()> {
///     let (_document, strings) = gujian_gamedata::GameDataReader::new().read(reader)?;
///
///     for (path, value) in strings.iter() {
///         println!("{path}: {value}");
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct GameDataReader {
    translations: StringTable,
    strings: StringTable,
}

impl GameDataReader {
    /// Create a reader that keeps strings as they are stored
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace strings by their non-empty translation while reading
    ///
    /// The string table returned by [`GameDataReader::read`] still holds the original strings.
    pub fn with_translations(mut self, translations: StringTable) -> Self {
        self.translations = translations;
        self
    }

    /// Decode a whole document
    #[instrument(skip_all, err)]
    pub fn read<R: Read + Seek>(mut self, mut reader: R) -> Result<(GameData, StringTable)> {
        let magic = reader.read_u32::<LittleEndian>()?;
        if !MAGICS.contains(&magic) {
            return Err(Error::BadMagic(magic));
        }

        let root = self.read_value(&mut reader, "", false)?;

        debug!(strings = self.strings.len(), "read gamedata document");

        Ok((GameData { magic, root }, self.strings))
    }

    fn read_value<R: Read + Seek>(
        &mut self,
        reader: &mut R,
        path: &str,
        is_key: bool,
    ) -> Result<GameDataValue> {
        let tag = reader.read_u8()?;
        self.read_tagged(reader, tag, path, is_key)
    }

    fn read_tagged<R: Read + Seek>(
        &mut self,
        reader: &mut R,
        tag: u8,
        path: &str,
        is_key: bool,
    ) -> Result<GameDataValue> {
        let value = match tag {
            tag::NIL => GameDataValue::Nil,
            tag::TRUE => GameDataValue::Bool(true),
            tag::FALSE => GameDataValue::Bool(false),
            tag::BYTE => GameDataValue::Byte(reader.read_i8()?),
            tag::SHORT => GameDataValue::Short(reader.read_i16::<LittleEndian>()?),
            tag::INT => GameDataValue::Int(reader.read_i32::<LittleEndian>()?),
            tag::LONG => GameDataValue::Long(reader.read_i64::<LittleEndian>()?),
            tag::DOUBLE => GameDataValue::Double(reader.read_f64::<LittleEndian>()?),
            tag::SHORT_STRING => {
                let len = reader.read_u8()? as usize;
                self.read_string(reader, len, path, is_key)?
            }
            tag::LONG_STRING => {
                let len = reader.read_u16::<LittleEndian>()? as usize;
                self.read_string(reader, len, path, is_key)?
            }
            tag::MAP => GameDataValue::Map(self.read_map(reader, path)?),
            tag::TUPLE => {
                let first = self.read_value(reader, path, false)?;
                let second = self.read_value(reader, path, false)?;
                GameDataValue::tuple(first, second)
            }
            tag::SHORT_REF => GameDataValue::TypedRef(reader.read_u16::<LittleEndian>()? as u32),
            tag::LONG_REF => GameDataValue::TypedRef(reader.read_u32::<LittleEndian>()?),
            _ => {
                return Err(Error::UnknownTag {
                    tag,
                    offset: reader.stream_position()? - 1,
                })
            }
        };

        Ok(value)
    }

    fn read_string<R: Read + Seek>(
        &mut self,
        reader: &mut R,
        len: usize,
        path: &str,
        is_key: bool,
    ) -> Result<GameDataValue> {
        let mut buffer = vec![0u8; len];
        reader.read_exact(&mut buffer)?;
        let value = String::from_utf8(buffer)?;

        if is_key {
            return Ok(GameDataValue::Str(value));
        }

        if !self.strings.try_insert(path.to_owned(), value.clone()) {
            return Err(Error::DuplicatePath(path.to_owned()));
        }

        match self.translations.get(path) {
            Some(translated) if !translated.is_empty() => Ok(GameDataValue::Str(translated.clone())),
            _ => Ok(GameDataValue::Str(value)),
        }
    }

    fn read_map<R: Read + Seek>(&mut self, reader: &mut R, path: &str) -> Result<ObjectMap> {
        let offset = reader.stream_position()?;
        let count = reader.read_i32::<LittleEndian>()?;
        if count < 0 {
            return Err(Error::NegativeChildCount { count, offset });
        }

        let mut children = Vec::with_capacity((count as usize).min(1024));
        for i in 0..count {
            children.push(self.read_value(reader, &format!("{path}/{i}"), false)?);
        }

        let mut entries = IndexMap::new();
        loop {
            let key_tag = reader.read_u8()?;
            if key_tag == tag::NIL {
                break;
            }

            let key = self.read_tagged(reader, key_tag, path, true)?;
            let value = self.read_value(reader, &format!("{path}/{key}"), false)?;
            entries.insert(key, value);
        }

        Ok(ObjectMap { children, entries })
    }
}
