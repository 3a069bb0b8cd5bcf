//! ZIP container reading.
//!
//! VPK directory files are often shipped inside ZIP bundles, sometimes
//! several levels deep. This module lists and decompresses container
//! entries so the traversal can look inside them.
//!
//! ## Architecture
//!
//! - [`structures`]: Data structures representing ZIP format elements (EOCD, file headers, etc.)
//! - [`parser`]: Low-level parsing of ZIP structures from raw bytes
//! - [`extractor`]: Entry decompression into memory
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for files > 4GB
//! - STORED and DEFLATE compression methods
//! - CRC-32 verification of extracted data
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No BZIP2, LZMA, or other compression methods

mod extractor;
mod parser;
mod structures;

pub use extractor::ZipExtractor;
pub use parser::ZipParser;
pub use structures::*;

/// Whether an entry name denotes a nested ZIP container
pub fn is_zip_name(name: &str) -> bool {
    name.len() >= 4
        && name
            .get(name.len() - 4..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(".zip"))
}

/// Whether data starts with a Local File Header signature
pub fn has_zip_signature(data: &[u8]) -> bool {
    data.starts_with(LFH_SIGNATURE)
}
