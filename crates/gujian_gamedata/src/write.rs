//! Types for writing GameData documents
//!

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::types::{tag, GameData, GameDataValue, ObjectMap};

impl GameData {
    /// Encode the document
    ///
    /// Decoding the output gives back an equal document.
    #[instrument(skip_all, err)]
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_u32::<LittleEndian>(self.magic)?;
        write_value(&mut writer, &self.root)
    }

    /// Encode the document into a new buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write(&mut buffer)?;
        Ok(buffer)
    }
}

fn write_value<W: Write>(writer: &mut W, value: &GameDataValue) -> Result<()> {
    match value {
        GameDataValue::Nil => writer.write_u8(tag::NIL)?,
        GameDataValue::Bool(true) => writer.write_u8(tag::TRUE)?,
        GameDataValue::Bool(false) => writer.write_u8(tag::FALSE)?,
        GameDataValue::Byte(v) => {
            writer.write_u8(tag::BYTE)?;
            writer.write_i8(*v)?;
        }
        GameDataValue::Short(v) => {
            writer.write_u8(tag::SHORT)?;
            writer.write_i16::<LittleEndian>(*v)?;
        }
        GameDataValue::Int(v) => {
            writer.write_u8(tag::INT)?;
            writer.write_i32::<LittleEndian>(*v)?;
        }
        GameDataValue::Long(v) => {
            writer.write_u8(tag::LONG)?;
            writer.write_i64::<LittleEndian>(*v)?;
        }
        GameDataValue::Double(v) => {
            writer.write_u8(tag::DOUBLE)?;
            writer.write_f64::<LittleEndian>(*v)?;
        }
        GameDataValue::Str(s) => write_string(writer, s)?,
        GameDataValue::Map(map) => write_map(writer, map)?,
        GameDataValue::Tuple(first, second) => {
            writer.write_u8(tag::TUPLE)?;
            write_value(writer, first)?;
            write_value(writer, second)?;
        }
        GameDataValue::TypedRef(v) => match u16::try_from(*v) {
            Ok(short) => {
                writer.write_u8(tag::SHORT_REF)?;
                writer.write_u16::<LittleEndian>(short)?;
            }
            Err(_) => {
                writer.write_u8(tag::LONG_REF)?;
                writer.write_u32::<LittleEndian>(*v)?;
            }
        },
    }

    Ok(())
}

fn write_string<W: Write>(writer: &mut W, value: &str) -> Result<()> {
    let bytes = value.as_bytes();
    if let Ok(len) = u8::try_from(bytes.len()) {
        writer.write_u8(tag::SHORT_STRING)?;
        writer.write_u8(len)?;
    } else {
        let len = u16::try_from(bytes.len()).map_err(|_| Error::StringTooLong(bytes.len()))?;
        writer.write_u8(tag::LONG_STRING)?;
        writer.write_u16::<LittleEndian>(len)?;
    }
    writer.write_all(bytes)?;
    Ok(())
}

fn write_map<W: Write>(writer: &mut W, map: &ObjectMap) -> Result<()> {
    writer.write_u8(tag::MAP)?;
    writer.write_i32::<LittleEndian>(map.children.len() as i32)?;
    for child in &map.children {
        write_value(writer, child)?;
    }

    for (key, value) in &map.entries {
        if matches!(key, GameDataValue::Nil) {
            return Err(Error::NilMapKey);
        }
        write_value(writer, key)?;
        write_value(writer, value)?;
    }

    writer.write_u8(tag::NIL)?;
    Ok(())
}
