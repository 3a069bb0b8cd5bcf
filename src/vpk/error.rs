use thiserror::Error;

/// Failures while decoding a single VPK directory file.
///
/// Every variant is fatal for the archive being decoded. Callers walking a
/// container hierarchy downgrade them to warnings instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VpkError {
    #[error("Invalid VPK signature: expected {expected:#x}, got {actual:#x}")]
    InvalidSignature { expected: u32, actual: u32 },

    #[error("Unsupported VPK version: {0}. Only version 1 and 2 are supported")]
    UnsupportedVersion(u32),

    #[error("Invalid entry terminator at offset {offset}: expected {expected:#x}, got {actual:#x}")]
    InvalidEntryTerminator {
        expected: u16,
        actual: u16,
        offset: u64,
    },

    #[error("Read of {needed} bytes at offset {offset} runs past end of data ({len} bytes)")]
    OutOfBounds {
        offset: u64,
        needed: usize,
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, VpkError>;
