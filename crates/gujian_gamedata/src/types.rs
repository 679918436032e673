//! Base types for the structure of a GameData document.

use derive_more::derive::{Constructor, Deref};
use indexmap::IndexMap;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Magic numbers of the documents the game ships
pub const MAGICS: [u32; 2] = [0xF206_0881, 0xD5B5_0981];

/// Value tags
pub mod tag {
    pub const NIL: u8 = 0x00;
    pub const TRUE: u8 = 0x01;
    pub const FALSE: u8 = 0x02;
    pub const BYTE: u8 = 0x03;
    pub const SHORT: u8 = 0x04;
    pub const INT: u8 = 0x05;
    pub const LONG: u8 = 0x06;
    pub const DOUBLE: u8 = 0x07;
    pub const SHORT_STRING: u8 = 0x08;
    pub const LONG_STRING: u8 = 0x09;
    pub const MAP: u8 = 0x0B;
    pub const TUPLE: u8 = 0x0D;
    pub const SHORT_REF: u8 = 0x0F;
    pub const LONG_REF: u8 = 0x10;
}

/// A single decoded value
///
/// Integers keep the width they were stored with, so a document decodes and encodes back to the
/// same bytes.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GameDataValue {
    #[default]
    Nil,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Double(f64),
    Str(String),
    Map(ObjectMap),
    Tuple(Box<GameDataValue>, Box<GameDataValue>),
    TypedRef(u32),
}

impl GameDataValue {
    /// Create a tuple value
    pub fn tuple(first: GameDataValue, second: GameDataValue) -> Self {
        GameDataValue::Tuple(Box::new(first), Box::new(second))
    }

    /// The string held by this value, if it is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            GameDataValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The map held by this value, if it is one
    pub fn as_map(&self) -> Option<&ObjectMap> {
        match self {
            GameDataValue::Map(map) => Some(map),
            _ => None,
        }
    }

    fn discriminant(&self) -> u8 {
        match self {
            GameDataValue::Nil => 0,
            GameDataValue::Bool(_) => 1,
            GameDataValue::Byte(_) => 2,
            GameDataValue::Short(_) => 3,
            GameDataValue::Int(_) => 4,
            GameDataValue::Long(_) => 5,
            GameDataValue::Double(_) => 6,
            GameDataValue::Str(_) => 7,
            GameDataValue::Map(_) => 8,
            GameDataValue::Tuple(..) => 9,
            GameDataValue::TypedRef(_) => 10,
        }
    }
}

// Doubles compare by bit pattern so values can key a map
impl PartialEq for GameDataValue {
    fn eq(&self, other: &Self) -> bool {
        use GameDataValue::*;
        match (self, other) {
            (Nil, Nil) => true,
            (Bool(a), Bool(b)) => a == b,
            (Byte(a), Byte(b)) => a == b,
            (Short(a), Short(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Double(a), Double(b)) => a.to_bits() == b.to_bits(),
            (Str(a), Str(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            (Tuple(a1, a2), Tuple(b1, b2)) => a1 == b1 && a2 == b2,
            (TypedRef(a), TypedRef(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for GameDataValue {}

impl Hash for GameDataValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.discriminant().hash(state);
        match self {
            GameDataValue::Nil => {}
            GameDataValue::Bool(v) => v.hash(state),
            GameDataValue::Byte(v) => v.hash(state),
            GameDataValue::Short(v) => v.hash(state),
            GameDataValue::Int(v) => v.hash(state),
            GameDataValue::Long(v) => v.hash(state),
            GameDataValue::Double(v) => v.to_bits().hash(state),
            GameDataValue::Str(v) => v.hash(state),
            GameDataValue::Map(v) => v.hash(state),
            GameDataValue::Tuple(a, b) => {
                a.hash(state);
                b.hash(state);
            }
            GameDataValue::TypedRef(v) => v.hash(state),
        }
    }
}

/// Renders a value the way it appears as a path segment when used as a map key
impl Display for GameDataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameDataValue::Nil => Ok(()),
            GameDataValue::Bool(true) => f.write_str("True"),
            GameDataValue::Bool(false) => f.write_str("False"),
            // Bytes are unsigned in existing translation files
            GameDataValue::Byte(v) => write!(f, "b:{}", *v as u8),
            GameDataValue::Short(v) => write!(f, "s:{v}"),
            GameDataValue::Int(v) => write!(f, "i:{v}"),
            GameDataValue::Long(v) => write!(f, "l:{v}"),
            GameDataValue::Double(v) => write_double(f, *v),
            GameDataValue::Str(v) => f.write_str(v),
            GameDataValue::Map(_) => f.write_str("{map}"),
            GameDataValue::Tuple(a, b) => write!(f, "({a},{b})"),
            GameDataValue::TypedRef(v) => write!(f, "r:{v}"),
        }
    }
}

/// Shortest round-trip form, in `1E+20` style when the decimal exponent is below -4 or above 14
fn write_double(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_nan() {
        return f.write_str("NaN");
    }
    if v.is_infinite() {
        return f.write_str(if v > 0.0 { "Infinity" } else { "-Infinity" });
    }
    if v == 0.0 {
        return write!(f, "{v}");
    }

    let scientific = format!("{v:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return write!(f, "{v}");
    };
    match exponent.parse::<i32>() {
        Ok(exponent) if !(-4..15).contains(&exponent) => {
            let sign = if exponent < 0 { '-' } else { '+' };
            write!(f, "{mantissa}E{sign}{:02}", exponent.abs())
        }
        _ => write!(f, "{v}"),
    }
}

/// An object map: positional children followed by ordered key/value entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectMap {
    /// Values addressed by position
    pub children: Vec<GameDataValue>,

    /// Values addressed by key, in stored order
    #[cfg_attr(feature = "serde", serde(with = "crate::serialize::pairs"))]
    pub entries: IndexMap<GameDataValue, GameDataValue>,
}

impl Hash for ObjectMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.children.hash(state);
        self.entries.len().hash(state);
        for (key, value) in &self.entries {
            key.hash(state);
            value.hash(state);
        }
    }
}

/// A whole document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GameData {
    /// Document magic, one of [`MAGICS`]
    pub magic: u32,

    /// The root value, normally a map
    pub root: GameDataValue,
}

/// Strings of a document keyed by their path
#[derive(Constructor, Clone, Debug, Default, PartialEq, Eq, Deref)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct StringTable(IndexMap<String, String>);

impl StringTable {
    /// Record `value` under `path`, returning `false` when the path is already taken
    pub fn try_insert(&mut self, path: String, value: String) -> bool {
        match self.0.entry(path) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(value);
                true
            }
        }
    }

    /// Set the string for `path`
    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<String>) {
        self.0.insert(path.into(), value.into());
    }

    /// Take the underlying map
    pub fn into_inner(self) -> IndexMap<String, String> {
        self.0
    }
}

impl FromIterator<(String, String)> for StringTable {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        StringTable(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod test {
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    use crate::types::{GameDataValue, ObjectMap};

    #[test]
    fn key_segments() {
        assert_eq!(GameDataValue::Nil.to_string(), "");
        assert_eq!(GameDataValue::Bool(true).to_string(), "True");
        assert_eq!(GameDataValue::Bool(false).to_string(), "False");
        assert_eq!(GameDataValue::Byte(-1).to_string(), "b:255");
        assert_eq!(GameDataValue::Short(-2).to_string(), "s:-2");
        assert_eq!(GameDataValue::Int(42).to_string(), "i:42");
        assert_eq!(GameDataValue::Long(7).to_string(), "l:7");
        assert_eq!(GameDataValue::Double(1.5).to_string(), "1.5");
        assert_eq!(GameDataValue::Str("name".into()).to_string(), "name");
    }

    #[test]
    fn double_segments() {
        let cases = [
            (1e20, "1E+20"),
            (-1.25e15, "-1.25E+15"),
            (123456789012345.0, "123456789012345"),
            (0.0001, "0.0001"),
            (0.00001, "1E-05"),
            (2.5e-300, "2.5E-300"),
            (0.1, "0.1"),
            (-0.0, "-0"),
            (f64::INFINITY, "Infinity"),
            (f64::NAN, "NaN"),
        ];

        for (value, expected) in cases {
            assert_eq!(GameDataValue::Double(value).to_string(), expected);
        }
    }

    #[test]
    fn widths_are_distinct_keys() {
        let mut entries = IndexMap::new();
        entries.insert(GameDataValue::Byte(1), GameDataValue::Nil);
        entries.insert(GameDataValue::Int(1), GameDataValue::Nil);
        entries.insert(GameDataValue::Double(1.0), GameDataValue::Nil);
        entries.insert(GameDataValue::Byte(1), GameDataValue::Bool(true));

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], GameDataValue::Bool(true));
    }

    #[test]
    fn map_equality_compares_children() {
        let a = ObjectMap {
            children: vec![GameDataValue::Int(1)],
            ..Default::default()
        };
        let b = ObjectMap {
            children: vec![GameDataValue::Int(2)],
            ..Default::default()
        };

        assert_ne!(GameDataValue::Map(a.clone()), GameDataValue::Map(b));
        assert_eq!(GameDataValue::Map(a.clone()), GameDataValue::Map(a));
    }
}
