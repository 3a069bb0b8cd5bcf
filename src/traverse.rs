//! Recursive search for VPK directory files inside ZIP containers.
//!
//! Each level hands its entries to [`ArchiveTraversal`], which decodes every
//! `_dir.vpk` it sees and opens every `.zip` it sees through an [`Unpack`]
//! implementation. Failures never abort the walk: a bad archive or container
//! becomes a [`TraversalWarning`] and its siblings are still processed.

use anyhow::Result;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

use crate::io::MemoryReader;
use crate::report::{TraversalResult, TraversalWarning, WarningKind};
use crate::vpk;
use crate::zip::{self, ZipExtractor};

/// Default limit on how many containers may nest below the root
pub const DEFAULT_MAX_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalOptions {
    pub max_depth: usize,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Decompressed contents of one container
#[derive(Debug, Default)]
pub struct Unpacked {
    /// Entry path and bytes, in container order
    pub entries: Vec<(String, Vec<u8>)>,
    /// Entry path and failure reason for entries that could not be extracted
    pub failures: Vec<(String, String)>,
}

/// Opens a container and yields the entries the traversal cares about.
#[async_trait]
pub trait Unpack: Send + Sync {
    async fn unpack(&self, data: Vec<u8>) -> Result<Unpacked>;
}

/// Name-based candidate check: containers to descend into and directory files to decode
pub fn is_candidate(name: &str) -> bool {
    zip::is_zip_name(name) || vpk::is_directory_file(name)
}

/// [`Unpack`] backed by the crate's ZIP reader.
///
/// Only candidate entries are decompressed.
pub struct ZipUnpacker;

#[async_trait]
impl Unpack for ZipUnpacker {
    async fn unpack(&self, data: Vec<u8>) -> Result<Unpacked> {
        let extractor = ZipExtractor::new(Arc::new(MemoryReader::new(data)));
        let mut unpacked = Unpacked::default();

        for (entry, data) in extractor.extract_matching(is_candidate).await? {
            match data {
                Ok(bytes) => unpacked.entries.push((entry.file_name, bytes)),
                Err(e) => unpacked.failures.push((entry.file_name, format!("{e:#}"))),
            }
        }

        Ok(unpacked)
    }
}

type WalkFuture<'a> = Pin<Box<dyn Future<Output = TraversalResult> + Send + 'a>>;

pub struct ArchiveTraversal<U: Unpack> {
    unpacker: U,
    options: TraversalOptions,
}

impl<U: Unpack> ArchiveTraversal<U> {
    pub fn new(unpacker: U) -> Self {
        Self::with_options(unpacker, TraversalOptions::default())
    }

    pub fn with_options(unpacker: U, options: TraversalOptions) -> Self {
        Self { unpacker, options }
    }

    /// Open a root container and walk everything below it.
    ///
    /// # Errors
    ///
    /// Only if the root container itself cannot be opened. Everything below
    /// it is reported through [`TraversalResult::warnings`].
    pub async fn traverse_container(&self, data: Vec<u8>) -> Result<TraversalResult> {
        let unpacked = self.unpacker.unpack(data).await?;
        let mut result = TraversalResult::default();
        record_failures(&mut result, "", unpacked.failures);
        result.merge(self.traverse(unpacked.entries, "").await);
        Ok(result)
    }

    /// Walk already-unpacked entries, keying results under `prefix`.
    pub async fn traverse(&self, entries: Vec<(String, Vec<u8>)>, prefix: &str) -> TraversalResult {
        self.walk(entries, prefix.to_string(), 0).await
    }

    fn walk(&self, entries: Vec<(String, Vec<u8>)>, prefix: String, depth: usize) -> WalkFuture<'_> {
        Box::pin(async move {
            let mut result = TraversalResult::default();

            for (path, bytes) in entries {
                let full_path = join_path(&prefix, &path);

                if zip::is_zip_name(&path) {
                    if depth >= self.options.max_depth {
                        result.warn(TraversalWarning {
                            path: full_path,
                            kind: WarningKind::DepthLimit,
                            reason: format!("nesting deeper than {} containers", self.options.max_depth),
                        });
                        continue;
                    }

                    debug!(path = %full_path, depth, "opening nested container");
                    match self.unpacker.unpack(bytes).await {
                        Ok(unpacked) => {
                            record_failures(&mut result, &full_path, unpacked.failures);
                            // The subtree owns its result until it completes
                            let child = self.walk(unpacked.entries, full_path, depth + 1).await;
                            result.merge(child);
                        }
                        Err(e) => result.warn(TraversalWarning {
                            path: full_path,
                            kind: WarningKind::Container,
                            reason: format!("{e:#}"),
                        }),
                    }
                } else if vpk::is_directory_file(&path) {
                    match vpk::parse_vpk(&bytes) {
                        Ok(report) => {
                            debug!(path = %full_path, files = report.file_count, "decoded directory file");
                            result.insert(full_path, report);
                        }
                        Err(e) => result.warn(TraversalWarning {
                            path: full_path,
                            kind: WarningKind::Archive,
                            reason: e.to_string(),
                        }),
                    }
                }
            }

            result
        })
    }
}

/// Scan a ZIP container held in memory with the built-in ZIP reader
pub async fn scan_zip(data: Vec<u8>, options: TraversalOptions) -> Result<TraversalResult> {
    ArchiveTraversal::with_options(ZipUnpacker, options)
        .traverse_container(data)
        .await
}

fn join_path(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        path.to_string()
    } else {
        format!("{prefix}/{path}")
    }
}

fn record_failures(result: &mut TraversalResult, prefix: &str, failures: Vec<(String, String)>) {
    for (path, reason) in failures {
        result.warn(TraversalWarning {
            path: join_path(prefix, &path),
            kind: WarningKind::Entry,
            reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Containers are fake: their "bytes" are a key into a lookup table
    struct FakeUnpacker {
        containers: HashMap<Vec<u8>, Vec<(String, Vec<u8>)>>,
    }

    #[async_trait]
    impl Unpack for FakeUnpacker {
        async fn unpack(&self, data: Vec<u8>) -> Result<Unpacked> {
            match self.containers.get(&data) {
                Some(entries) => Ok(Unpacked {
                    entries: entries.clone(),
                    failures: Vec::new(),
                }),
                None => anyhow::bail!("Not a valid ZIP file"),
            }
        }
    }

    fn empty_vpk() -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0x55AA1234u32.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());
        out.push(0);
        out
    }

    fn entry(name: &str, data: Vec<u8>) -> (String, Vec<u8>) {
        (name.to_string(), data)
    }

    #[tokio::test]
    async fn corrupt_sibling_is_skipped() {
        let traversal = ArchiveTraversal::new(FakeUnpacker {
            containers: HashMap::new(),
        });
        let entries = vec![
            entry("bad_dir.vpk", b"garbage!".to_vec()),
            entry("good_dir.vpk", empty_vpk()),
            entry("pak01_000.vpk", b"payload".to_vec()),
            entry("readme.txt", b"hi".to_vec()),
        ];

        let result = traversal.traverse(entries, "").await;
        assert_eq!(result.archives.keys().collect::<Vec<_>>(), ["good_dir.vpk"]);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].path, "bad_dir.vpk");
        assert_eq!(result.warnings[0].kind, WarningKind::Archive);
    }

    #[tokio::test]
    async fn nested_containers_prefix_keys() {
        let mut containers = HashMap::new();
        containers.insert(b"outer".to_vec(), vec![entry("inner.ZIP", b"inner".to_vec())]);
        containers.insert(b"inner".to_vec(), vec![entry("game/pak01_dir.vpk", empty_vpk())]);
        let traversal = ArchiveTraversal::new(FakeUnpacker { containers });

        let result = traversal
            .traverse(vec![entry("outer.zip", b"outer".to_vec())], "")
            .await;
        assert!(result.is_clean());
        assert!(result.archives.contains_key("outer.zip/inner.ZIP/game/pak01_dir.vpk"));
    }

    #[tokio::test]
    async fn broken_container_does_not_stop_siblings() {
        let traversal = ArchiveTraversal::new(FakeUnpacker {
            containers: HashMap::new(),
        });
        let entries = vec![
            entry("broken.zip", b"nope".to_vec()),
            entry("ok_dir.vpk", empty_vpk()),
        ];

        let result = traversal.traverse(entries, "root.zip").await;
        assert!(result.archives.contains_key("root.zip/ok_dir.vpk"));
        assert_eq!(result.warnings[0].path, "root.zip/broken.zip");
        assert_eq!(result.warnings[0].kind, WarningKind::Container);
    }

    #[tokio::test]
    async fn depth_limit_stops_self_nesting() {
        let mut containers = HashMap::new();
        containers.insert(b"loop".to_vec(), vec![entry("again.zip", b"loop".to_vec())]);
        let traversal = ArchiveTraversal::with_options(
            FakeUnpacker { containers },
            TraversalOptions { max_depth: 3 },
        );

        let result = traversal
            .traverse(vec![entry("again.zip", b"loop".to_vec())], "")
            .await;
        assert!(result.archives.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::DepthLimit);
        assert_eq!(result.warnings[0].path, "again.zip/again.zip/again.zip/again.zip");
    }

    #[tokio::test]
    async fn root_failure_is_an_error() {
        let traversal = ArchiveTraversal::new(FakeUnpacker {
            containers: HashMap::new(),
        });
        assert!(traversal.traverse_container(b"x".to_vec()).await.is_err());
    }

    #[test]
    fn candidates() {
        assert!(is_candidate("a/b/pak01_dir.vpk"));
        assert!(is_candidate("Maps.Zip"));
        assert!(!is_candidate("pak01_003.vpk"));
        assert!(!is_candidate("PAK01_DIR.VPK"));
    }
}
