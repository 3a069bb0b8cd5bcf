//! # vpkscan
//!
//! Inspect Valve VPK archives without extracting them.
//!
//! A VPK directory file (`*_dir.vpk`) carries the index of every packed
//! file: its virtual path, CRC-32, which numbered data archive holds it and
//! where. This library decodes that index into an [`ArchiveReport`], and can
//! search ZIP containers (including ZIPs nested in ZIPs) for directory files
//! to decode.
//!
//! ## Features
//!
//! - VPK directory file versions 1 and 2
//! - Typed decode errors ([`VpkError`])
//! - Recursive ZIP traversal with per-branch warnings instead of aborts
//! - ZIP64, STORED and DEFLATE containers
//!
//! ## Example
//!
//! ```no_run
//! use vpkscan::{TraversalOptions, parse_vpk, scan_zip};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let report = parse_vpk(&std::fs::read("pak01_dir.vpk")?)?;
//!     for file in &report.files {
//!         println!("{} ({} bytes)", file.path, file.total_size());
//!     }
//!
//!     let bundle = scan_zip(std::fs::read("bundle.zip")?, TraversalOptions::default()).await?;
//!     for (path, report) in &bundle.archives {
//!         println!("{path}: {} files", report.file_count);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod io;
pub mod report;
pub mod traverse;
pub mod vpk;
pub mod zip;

pub use cli::{Cli, InputFormat};
pub use io::{LocalFileReader, MemoryReader, ReadAt};
pub use report::{ArchiveReport, TraversalResult, TraversalWarning, WarningKind};
pub use traverse::{ArchiveTraversal, TraversalOptions, Unpack, Unpacked, ZipUnpacker, scan_zip};
pub use vpk::{FileEntry, VpkError, parse_vpk};
pub use zip::{ZipExtractor, ZipFileEntry};
