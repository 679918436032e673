//! Merging a tree of source files into a name index
//!

use tracing::{debug, info};

use crate::names::NameIndex;
use crate::types::ContentHash;

/// What happened to a processed file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    /// The name already points at the same content
    Unchanged,
    /// The name pointed at other content and was moved to the new hash
    Updated {
        /// the hash the name used to point at
        previous: ContentHash,
    },
    /// A new name with content not stored anywhere yet
    Added,
    /// A new name sharing content already known to the index
    AddedDuplicate,
}

impl PlanAction {
    /// Whether the content was staged for the new shard
    pub fn is_staged(&self) -> bool {
        matches!(self, PlanAction::Updated { .. } | PlanAction::Added)
    }
}

/// Content waiting to be written to a new shard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// SHA-1 of `content`, the hash it is stored under
    pub hash: ContentHash,
    /// The name that caused the content to be staged
    pub path: String,
    /// Uncompressed file contents
    pub content: Vec<u8>,
}

/// Updates a [`NameIndex`] with the files of a source tree
///
/// Each file is compared against the name it is stored under:
///
/// | Name  | Hash                  | Result                                       |
/// |-------|-----------------------|----------------------------------------------|
/// | known | same as stored        | [`PlanAction::Unchanged`]                     |
/// | known | different             | [`PlanAction::Updated`], content staged       |
/// | new   | unknown to the index  | [`PlanAction::Added`], content staged         |
/// | new   | known to the index    | [`PlanAction::AddedDuplicate`], nothing staged |
///
/// An updated file is staged even if its new hash is already stored, so the same content can
/// end up in two shards.
#[derive(Debug)]
pub struct BuildPlanner<'a> {
    index: &'a mut NameIndex,
    staged: Vec<StagedFile>,
}

impl<'a> BuildPlanner<'a> {
    /// Start a build pass over `index`
    pub fn new(index: &'a mut NameIndex) -> BuildPlanner<'a> {
        BuildPlanner {
            index,
            staged: Vec::new(),
        }
    }

    /// Merge the file stored under `path`
    pub fn process(&mut self, path: &str, hash: ContentHash, content: Vec<u8>) -> PlanAction {
        let action = match self.index.hash_of(path) {
            Some(stored) if stored == hash => PlanAction::Unchanged,
            Some(previous) => {
                self.index.insert(path, hash);
                self.stage(path, hash, content);
                PlanAction::Updated { previous }
            }
            None if self.index.contains_hash(&hash) => {
                self.index.insert(path, hash);
                PlanAction::AddedDuplicate
            }
            None => {
                self.index.insert(path, hash);
                self.stage(path, hash, content);
                PlanAction::Added
            }
        };

        match action {
            PlanAction::Unchanged => debug!(path, %hash, "unchanged"),
            _ => info!(path, %hash, ?action, "planned"),
        }

        action
    }

    /// Hash `content` and merge it
    pub fn process_content(&mut self, path: &str, content: Vec<u8>) -> PlanAction {
        let hash = ContentHash::of(&content);
        self.process(path, hash, content)
    }

    fn stage(&mut self, path: &str, hash: ContentHash, content: Vec<u8>) {
        self.staged.push(StagedFile {
            hash,
            path: path.to_owned(),
            content,
        });
    }

    /// The index being updated
    pub fn index(&self) -> &NameIndex {
        self.index
    }

    /// Content staged so far, in processing order
    pub fn staged(&self) -> &[StagedFile] {
        &self.staged
    }

    /// Finish the pass, returning the staged content in processing order
    pub fn into_staged(self) -> Vec<StagedFile> {
        self.staged
    }
}
