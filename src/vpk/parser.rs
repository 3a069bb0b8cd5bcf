//! Decoder for VPK directory files.
//!
//! ## Layout
//!
//! A directory file starts with a little-endian header:
//!
//! ```text
//! u32 signature (0x55AA1234) | u32 version | u32 tree size | [v2: 4 x u32]
//! ```
//!
//! followed by the directory tree, three nested levels of NUL-terminated
//! strings. An empty string closes the current level:
//!
//! ```text
//! extension
//!     path
//!         filename  -> 18 byte record [+ preload bytes]
//!         ...
//!         ""        (end of this path)
//!     ""            (end of this extension)
//! ""                (end of tree)
//! ```
//!
//! The tree size from the header is recorded but decoding stops on the
//! empty-string sentinels, not on the byte count.

use tracing::debug;

use super::cursor::ByteCursor;
use super::error::{Result, VpkError};
use super::path::build_virtual_path;
use super::structures::{ArchiveHeader, ENTRY_TERMINATOR, FileEntry};
use crate::report::ArchiveReport;

/// Single-pass decoder over one materialized directory file.
pub struct VpkParser<'a> {
    cursor: ByteCursor<'a>,
}

impl<'a> VpkParser<'a> {
    /// Create a decoder positioned at the start of `data`.
    ///
    /// # Arguments
    ///
    /// * `data` - The complete directory file
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::new(data),
        }
    }

    /// Offset of the next unread byte
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Read and validate the header, leaving the cursor at the tree.
    ///
    /// # Errors
    ///
    /// [`VpkError::InvalidSignature`] after the first 4 bytes,
    /// [`VpkError::UnsupportedVersion`] after the first 8, or
    /// [`VpkError::OutOfBounds`] if the header is truncated.
    pub fn read_header(&mut self) -> Result<ArchiveHeader> {
        let signature = self.cursor.read_u32_le()?;
        if signature != ArchiveHeader::SIGNATURE {
            return Err(VpkError::InvalidSignature {
                expected: ArchiveHeader::SIGNATURE,
                actual: signature,
            });
        }

        let version = self.cursor.read_u32_le()?;
        if !ArchiveHeader::is_supported_version(version) {
            return Err(VpkError::UnsupportedVersion(version));
        }

        let tree_size = self.cursor.read_u32_le()?;

        if version == 2 {
            self.cursor.skip(ArchiveHeader::V2_TRAILER_SIZE as u64);
        }

        Ok(ArchiveHeader {
            signature,
            version,
            tree_size,
        })
    }

    /// Walk the directory tree, returning entries in tree order
    /// (extension, then path, then filename).
    ///
    /// The cursor must sit at the first byte of the tree, which is where
    /// [`read_header`](Self::read_header) leaves it. Preload bytes are
    /// skipped, never retained.
    ///
    /// # Returns
    ///
    /// One [`FileEntry`] per record, with its virtual path already built.
    ///
    /// # Errors
    ///
    /// [`VpkError::InvalidEntryTerminator`] if a record does not end in
    /// `0xFFFF`, or [`VpkError::OutOfBounds`] if a record is cut short.
    /// Nothing decoded before the failure is returned.
    pub fn read_tree(&mut self) -> Result<Vec<FileEntry>> {
        let mut files = Vec::new();

        loop {
            let extension = self.cursor.read_null_terminated_string();
            if extension.is_empty() {
                break;
            }

            loop {
                let path = self.cursor.read_null_terminated_string();
                if path.is_empty() {
                    break;
                }

                loop {
                    let filename = self.cursor.read_null_terminated_string();
                    if filename.is_empty() {
                        break;
                    }

                    let entry = self.read_entry(&extension, &path, &filename)?;
                    files.push(entry);
                }
            }
        }

        Ok(files)
    }

    /// Parse one 18-byte record and skip its inline preload data.
    fn read_entry(&mut self, extension: &str, path: &str, filename: &str) -> Result<FileEntry> {
        let record_start = self.cursor.position();
        let crc = self.cursor.read_u32_le()?;
        let preload_bytes = self.cursor.read_u16_le()?;
        let archive_index = self.cursor.read_u16_le()?;
        let offset = self.cursor.read_u32_le()?;
        let length = self.cursor.read_u32_le()?;

        let terminator_offset = self.cursor.position();
        let terminator = self.cursor.read_u16_le()?;
        if terminator != ENTRY_TERMINATOR {
            return Err(VpkError::InvalidEntryTerminator {
                expected: ENTRY_TERMINATOR,
                actual: terminator,
                offset: terminator_offset,
            });
        }
        debug_assert_eq!(
            self.cursor.position() - record_start,
            FileEntry::RECORD_SIZE as u64
        );

        if preload_bytes > 0 {
            self.cursor.skip(preload_bytes as u64);
        }

        Ok(FileEntry {
            path: build_virtual_path(extension, path, filename),
            crc,
            preload_bytes,
            archive_index,
            offset,
            length,
        })
    }

    /// Decode the whole directory file into a report.
    ///
    /// # Returns
    ///
    /// An [`ArchiveReport`] carrying the header's version and tree size
    /// and every entry in tree order.
    ///
    /// # Errors
    ///
    /// Any error from [`read_header`](Self::read_header) or
    /// [`read_tree`](Self::read_tree).
    pub fn parse(mut self) -> Result<ArchiveReport> {
        let header = self.read_header()?;
        debug!(
            version = header.version,
            tree_size = header.tree_size,
            "read VPK header"
        );

        let files = self.read_tree()?;
        debug!(
            files = files.len(),
            position = self.position(),
            "decoded directory tree"
        );

        Ok(ArchiveReport::new(&header, files))
    }
}

/// Decode a VPK directory file held in memory
pub fn parse_vpk(data: &[u8]) -> Result<ArchiveReport> {
    VpkParser::new(data).parse()
}
