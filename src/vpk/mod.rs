//! VPK directory file decoding.
//!
//! Valve's VPK format splits an archive into a `*_dir.vpk` directory file
//! holding the index, plus numbered data archives holding the payloads. This
//! module only reads the directory file: it lists every packed file with its
//! CRC, location and size without touching payload bytes.
//!
//! - [`cursor`]: bounds-aware little-endian reader
//! - [`structures`]: header, entry record and format constants
//! - [`parser`]: header validation and directory tree walk

mod cursor;
mod error;
mod parser;
mod path;
mod structures;

pub use cursor::ByteCursor;
pub use error::{Result, VpkError};
pub use parser::{VpkParser, parse_vpk};
pub use path::build_virtual_path;
pub use structures::*;

/// File name suffix identifying a VPK directory file
pub const DIRECTORY_SUFFIX: &str = "_dir.vpk";

pub fn is_directory_file(name: &str) -> bool {
    name.ends_with(DIRECTORY_SUFFIX)
}
