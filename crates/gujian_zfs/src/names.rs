//! The name index mapping file names to the hashes stored in archives

use indexmap::{IndexMap, IndexSet};
use std::io::{Read, Write};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::types::ContentHash;

/// Names of the files stored in a set of archives
///
/// Every name maps to exactly one hash, while a hash may be shared by any number of names.
/// Both directions are kept in sync by every mutation. A hash whose last name was removed
/// stays known, with no names.
///
/// The text form is one `<hash>\t<name>` line per name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameIndex {
    names: IndexMap<String, ContentHash>,
    hashes: IndexMap<ContentHash, IndexSet<String>>,
}

impl NameIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the text form of an index
    pub fn parse(text: &str) -> Result<NameIndex> {
        let mut index = NameIndex::new();

        for (number, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }

            let Some((hash, name)) = line.split_once('\t') else {
                return Err(Error::InvalidNameIndex {
                    line: number + 1,
                    reason: "missing tab separator".to_owned(),
                });
            };

            let hash = hash.parse::<ContentHash>().map_err(|err| Error::InvalidNameIndex {
                line: number + 1,
                reason: err.to_string(),
            })?;
            index.insert(name, hash);
        }

        Ok(index)
    }

    /// Read the text form of an index
    #[instrument(skip_all, err)]
    pub fn read<R: Read>(mut reader: R) -> Result<NameIndex> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;

        let index = Self::parse(&text)?;
        debug!(names = index.len(), hashes = index.hashes.len(), "read name index");

        Ok(index)
    }

    /// Write the text form of the index
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        for (name, hash) in &self.names {
            writeln!(writer, "{hash}\t{name}")?;
        }
        Ok(())
    }

    /// The text form of the index
    pub fn to_text(&self) -> String {
        self.names
            .iter()
            .map(|(name, hash)| format!("{hash}\t{name}\n"))
            .collect()
    }

    /// Point `name` at `hash`, returning the hash it used to point at
    pub fn insert(&mut self, name: impl Into<String>, hash: ContentHash) -> Option<ContentHash> {
        let name = name.into();

        let previous = self.names.insert(name.clone(), hash);
        if let Some(previous) = previous {
            if let Some(names) = self.hashes.get_mut(&previous) {
                names.shift_remove(&name);
            }
        }
        self.hashes.entry(hash).or_default().insert(name);

        previous
    }

    /// Remove `name`, returning the hash it pointed at
    pub fn remove(&mut self, name: &str) -> Option<ContentHash> {
        let hash = self.names.shift_remove(name)?;
        if let Some(names) = self.hashes.get_mut(&hash) {
            names.shift_remove(name);
        }
        Some(hash)
    }

    /// Register a hash without giving it a name
    pub fn insert_hash(&mut self, hash: ContentHash) {
        self.hashes.entry(hash).or_default();
    }

    /// The hash `name` points at
    pub fn hash_of(&self, name: &str) -> Option<ContentHash> {
        self.names.get(name).copied()
    }

    /// The names pointing at `hash`, `None` if the hash is unknown
    pub fn names_for(&self, hash: &ContentHash) -> Option<&IndexSet<String>> {
        self.hashes.get(hash)
    }

    /// Whether `name` points at a hash
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Whether the hash is known, even if no name points at it anymore
    pub fn contains_hash(&self, hash: &ContentHash) -> bool {
        self.hashes.contains_key(hash)
    }

    /// Number of names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no name is stored, ignoring hashes without names
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over names and their hashes, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, ContentHash)> + '_ {
        self.names.iter().map(|(name, hash)| (name.as_str(), *hash))
    }

    /// Iterate over the known hashes and the names pointing at them
    pub fn hashes(&self) -> impl Iterator<Item = (ContentHash, &IndexSet<String>)> + '_ {
        self.hashes.iter().map(|(hash, names)| (*hash, names))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::names::NameIndex;
    use crate::types::ContentHash;

    const TEXT: &str = "\
a9993e364706816aba3e25717850c26c9cd0d89d\tdata/a.txt
a9993e364706816aba3e25717850c26c9cd0d89d\tdata/copy of a.txt
da39a3ee5e6b4b0d3255bfef95601890afd80709\tempty.bin
";

    #[test]
    fn parse_and_write() -> Result<()> {
        let index = NameIndex::parse(TEXT)?;

        assert_eq!(index.len(), 3);
        assert_eq!(index.hash_of("data/a.txt"), Some(ContentHash::of(b"abc")));
        assert_eq!(
            index
                .names_for(&ContentHash::of(b"abc"))
                .map(|names| names.iter().cloned().collect::<Vec<_>>()),
            Some(vec!["data/a.txt".to_owned(), "data/copy of a.txt".to_owned()])
        );
        assert_eq!(index.to_text(), TEXT);

        let mut written = Vec::new();
        index.write(&mut written)?;
        assert_eq!(written, TEXT.as_bytes());

        Ok(())
    }

    #[test]
    fn parse_crlf() -> Result<()> {
        let index = NameIndex::parse(&TEXT.replace('\n', "\r\n"))?;
        assert!(index.contains_name("empty.bin"));
        Ok(())
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            NameIndex::parse("a9993e364706816aba3e25717850c26c9cd0d89d data/a.txt\n"),
            Err(Error::InvalidNameIndex { line: 1, .. })
        ));
        assert!(matches!(
            NameIndex::parse(&format!("{TEXT}nothex\tb.txt\n")),
            Err(Error::InvalidNameIndex { line: 4, .. })
        ));
    }

    #[test]
    fn views_stay_consistent() {
        let first = ContentHash::of(b"first");
        let second = ContentHash::of(b"second");

        let mut index = NameIndex::new();
        assert_eq!(index.insert("a", first), None);
        index.insert("b", first);
        assert_eq!(index.insert("a", second), Some(first));

        assert_eq!(index.names_for(&first).map(|n| n.len()), Some(1));
        assert_eq!(index.names_for(&second).map(|n| n.len()), Some(1));

        assert_eq!(index.remove("b"), Some(first));
        assert_eq!(index.remove("b"), None);
        assert!(index.contains_hash(&first));
        assert_eq!(index.names_for(&first).map(|n| n.len()), Some(0));
        assert!(!index.contains_name("b"));
        assert_eq!(index.len(), 1);
    }
}
