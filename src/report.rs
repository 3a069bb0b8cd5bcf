//! Decoded archive reports and traversal results.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::vpk::{ArchiveHeader, FileEntry};

/// One decoded VPK directory file.
///
/// Built once from a header and its entries; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveReport {
    pub version: u32,
    pub tree_size: u32,
    pub file_count: u32,
    pub files: Vec<FileEntry>,
}

impl ArchiveReport {
    pub fn new(header: &ArchiveHeader, files: Vec<FileEntry>) -> Self {
        Self {
            version: header.version,
            tree_size: header.tree_size,
            file_count: files.len() as u32,
            files,
        }
    }

    /// Sum of preload and archive bytes over all entries
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(FileEntry::total_size).sum()
    }

    /// Entries whose data lives in the directory file itself
    pub fn embedded_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_embedded()).count()
    }
}

/// What went wrong with a skipped traversal branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// A `_dir.vpk` entry failed to decode
    Archive,
    /// A nested container could not be opened
    Container,
    /// A single container entry could not be decompressed
    Entry,
    /// A nested container sits deeper than the configured limit
    DepthLimit,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Archive => write!(f, "archive"),
            Self::Container => write!(f, "container"),
            Self::Entry => write!(f, "entry"),
            Self::DepthLimit => write!(f, "depth limit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraversalWarning {
    pub path: String,
    pub kind: WarningKind,
    pub reason: String,
}

impl fmt::Display for TraversalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to parse {} ({}): {}", self.path, self.kind, self.reason)
    }
}

/// Reports for every directory file found in a container hierarchy, keyed
/// by the `/`-joined path through any nested containers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalResult {
    pub archives: BTreeMap<String, ArchiveReport>,
    pub warnings: Vec<TraversalWarning>,
}

impl TraversalResult {
    pub fn insert(&mut self, path: String, report: ArchiveReport) {
        self.archives.insert(path, report);
    }

    pub fn warn(&mut self, warning: TraversalWarning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Fold a finished subtree into this result
    pub fn merge(&mut self, other: TraversalResult) {
        self.archives.extend(other.archives);
        self.warnings.extend(other.warnings);
    }

    pub fn archive_count(&self) -> usize {
        self.archives.len()
    }

    pub fn file_count(&self) -> u64 {
        self.archives.values().map(|r| r.file_count as u64).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl Serialize for TraversalResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.archives.serialize(serializer)
    }
}
