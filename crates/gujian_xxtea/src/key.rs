//! Cipher keys and the per-file key table.

use std::fmt::{self, Debug};

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Number of characters in a per-file key string
pub const FILE_KEY_LEN: usize = 40;

/// A 128 bit XXTEA key, stored as four little endian words
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CipherKey(pub [u32; 4]);

impl Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CipherKey({:08x?})", self.0)
    }
}

impl CipherKey {
    /// Build a key from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let mut words = [0u32; 4];
        LittleEndian::read_u32_into(&bytes, &mut words);
        CipherKey(words)
    }

    /// Use the first 16 characters of an ASCII secret directly as the key.
    pub fn from_secret(secret: &str) -> Result<Self> {
        if !secret.is_ascii() {
            return Err(Error::InvalidKey("secret must be ASCII".into()));
        }

        let bytes = secret.as_bytes();
        if bytes.len() < 16 {
            return Err(Error::InvalidKey(format!(
                "secret must be at least 16 characters, got {}",
                bytes.len()
            )));
        }

        let mut key = [0u8; 16];
        key.copy_from_slice(&bytes[..16]);
        Ok(Self::from_bytes(key))
    }

    /// Fold a 40 character per-file key string into a key.
    ///
    /// The string is extended to 48 characters by appending its characters 24..32, then
    /// every key byte is `s[i] ^ s[i + 16] ^ s[i + 32]`.
    pub fn from_file_key(key: &str) -> Result<Self> {
        if !key.is_ascii() || key.len() != FILE_KEY_LEN {
            return Err(Error::InvalidKey(format!(
                "file keys must be {FILE_KEY_LEN} ASCII characters"
            )));
        }

        let mut extended = [0u8; 48];
        extended[..FILE_KEY_LEN].copy_from_slice(key.as_bytes());
        extended[FILE_KEY_LEN..].copy_from_slice(&key.as_bytes()[24..32]);

        let mut folded = [0u8; 16];
        for (i, b) in folded.iter_mut().enumerate() {
            *b = extended[i] ^ extended[i + 16] ^ extended[i + 32];
        }

        Ok(Self::from_bytes(folded))
    }
}

/// Text form of the keys shipped with the game
const GAME_KEYS: &str = include_str!("../resources/keys.tsv");

#[derive(Debug, Clone, PartialEq, Eq)]
struct KeyTableEntry {
    suffix: String,
    key: CipherKey,
}

/// Lookup table from file path suffixes to their cipher keys
///
/// The text form has one entry per line, the path suffix and the 40 character key string
/// separated by a tab. Blank lines and lines starting with `#` are ignored. Suffixes use `/`
/// as the path separator, `\` is treated the same.
///
/// ```
/// # fn doit() -> gujian_xxtea::error::Result<()> {
/// let table = gujian_xxtea::KeyTable::parse(
///     "# suffix\tkey\nscript.dat\t0123456789abcdef0123456789abcdef01234567\n",
/// )?;
/// assert!(table.resolve("data/Script.DAT").is_some());
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyTable {
    entries: Vec<KeyTableEntry>,
}

impl KeyTable {
    /// Create an empty key table
    pub fn new() -> Self {
        Self::default()
    }

    /// The keys of the files the game ships encrypted
    pub fn game() -> Result<Self> {
        Self::parse(GAME_KEYS)
    }

    /// Parse the text form of a key table
    pub fn parse(text: &str) -> Result<Self> {
        let mut table = KeyTable::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (suffix, key) = line
                .split_once('\t')
                .ok_or(Error::InvalidKeyTable { line: number + 1 })?;

            table
                .insert(suffix.trim(), key.trim())
                .map_err(|_| Error::InvalidKeyTable { line: number + 1 })?;
        }
        Ok(table)
    }

    /// Add a per-file key string for every path ending in `suffix`
    pub fn insert(&mut self, suffix: impl Into<String>, key: &str) -> Result<()> {
        self.entries.push(KeyTableEntry {
            suffix: normalize(&suffix.into()),
            key: CipherKey::from_file_key(key)?,
        });
        Ok(())
    }

    /// Find the key for a path, comparing suffixes case-insensitively. The first match wins.
    pub fn resolve(&self, path: &str) -> Option<CipherKey> {
        let path = normalize(path);
        self.entries
            .iter()
            .find(|entry| path.ends_with(&entry.suffix))
            .map(|entry| entry.key)
    }

    /// Number of entries in the table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/").to_lowercase()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::key::{CipherKey, KeyTable};

    #[test]
    fn secret_key_uses_first_sixteen_bytes() -> Result<()> {
        let key = CipherKey::from_secret("ABCDEFGHIJKLMNOPextra")?;
        assert_eq!(
            key,
            CipherKey([0x44434241, 0x48474645, 0x4C4B4A49, 0x504F4E4D])
        );
        Ok(())
    }

    #[test]
    fn short_secret_is_rejected() {
        assert!(matches!(
            CipherKey::from_secret("short"),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn file_key_folds_three_ways() -> Result<()> {
        // Positions 24..32 hold 'b' so the extension repeats them over 40..48
        let source = format!(
            "{}{}{}{}",
            "a".repeat(16),
            "A".repeat(8),
            "b".repeat(8),
            "c".repeat(8)
        );
        let key = CipherKey::from_file_key(&source)?;

        let mut expected = [0u8; 16];
        for (i, b) in expected.iter_mut().enumerate() {
            *b = if i < 8 { b'a' ^ b'A' ^ b'c' } else { b'a' ^ b'b' ^ b'b' };
        }
        assert_eq!(key, CipherKey::from_bytes(expected));
        Ok(())
    }

    #[test]
    fn file_key_extension_repeats_middle() -> Result<()> {
        // The extension cancels characters 24..32 out of the upper half
        let source = "0000000000000000000000001234567800000000";
        let key = CipherKey::from_file_key(source)?;

        assert_eq!(key, CipherKey::from_bytes([b'0'; 16]));
        Ok(())
    }

    #[test]
    fn game_file_key() -> Result<()> {
        // cutscene\1010\cs_1010_1a.xxx
        let key = CipherKey::from_file_key("84bf71f9a6a44fa3f3e1a266166dac7297f6018b")?;
        assert_eq!(
            key,
            CipherKey([0x6161_3067, 0x6D68_3266, 0x3461_3661, 0x3361_6634])
        );
        Ok(())
    }

    #[test]
    fn file_key_requires_forty_characters() {
        assert!(CipherKey::from_file_key("0123").is_err());
    }

    #[test]
    fn table_resolves_case_insensitive_suffix() -> Result<()> {
        let table = KeyTable::parse(concat!(
            "# comment\n",
            "\n",
            "Script.dat\t0123456789abcdef0123456789abcdef01234567\n",
            "other.bin\tfedcba9876543210fedcba9876543210fedcba98\n",
        ))?;

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.resolve("game/SCRIPT.DAT"),
            Some(CipherKey::from_file_key(
                "0123456789abcdef0123456789abcdef01234567"
            )?)
        );
        assert_eq!(table.resolve("game/unknown.dat"), None);
        Ok(())
    }

    #[test]
    fn game_table() -> Result<()> {
        let table = KeyTable::game()?;

        assert_eq!(table.len(), 10);
        assert_eq!(
            table.resolve("Cutscene\\1010\\CS_1010_1A.xxx"),
            Some(CipherKey([0x6161_3067, 0x6D68_3266, 0x3461_3661, 0x3361_6634]))
        );
        assert_eq!(
            table.resolve("gujian3/sounds_console/voice_npc.xxx"),
            Some(CipherKey::from_file_key(
                "960513d4e71a2b003eda159891e102c43e344eed"
            )?)
        );
        assert_eq!(table.resolve("sounds_console/voice_p2.xxx"), None);
        Ok(())
    }

    #[test]
    fn table_reports_bad_line() {
        let result = KeyTable::parse("good.dat\t0123456789abcdef0123456789abcdef01234567\nbroken");
        assert!(matches!(result, Err(Error::InvalidKeyTable { line: 2 })));
    }
}
