use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Archive index meaning "data lives in the directory file itself"
pub const EMBEDDED_ARCHIVE_INDEX: u16 = 0x7FFF;

/// Marker closing every directory entry record
pub const ENTRY_TERMINATOR: u16 = 0xFFFF;

/// Placeholder the format uses for an absent extension, path or file name
pub const ABSENT_FIELD: &str = " ";

/// VPK directory file header - 12 bytes (v1) or 28 bytes (v2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub signature: u32,
    pub version: u32,
    pub tree_size: u32,
}

impl ArchiveHeader {
    pub const SIGNATURE: u32 = 0x55AA1234;
    pub const V1_SIZE: usize = 12;
    /// Four extra u32 fields: file data, archive MD5, other MD5 and signature section sizes
    pub const V2_TRAILER_SIZE: usize = 16;

    pub fn is_supported_version(version: u32) -> bool {
        matches!(version, 1 | 2)
    }

    /// Number of bytes the header occupies before the directory tree
    pub fn header_len(&self) -> usize {
        if self.version == 2 {
            Self::V1_SIZE + Self::V2_TRAILER_SIZE
        } else {
            Self::V1_SIZE
        }
    }
}

/// One file listed in the directory tree.
///
/// Preload bytes are skipped during decoding; only their count is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: String,
    pub crc: u32,
    pub preload_bytes: u16,
    pub archive_index: u16,
    pub offset: u32,
    pub length: u32,
}

impl FileEntry {
    /// Entry record size on the wire, terminator included
    pub const RECORD_SIZE: usize = 18;

    pub fn total_size(&self) -> u64 {
        self.preload_bytes as u64 + self.length as u64
    }

    pub fn is_embedded(&self) -> bool {
        self.archive_index == EMBEDDED_ARCHIVE_INDEX
    }
}

impl Serialize for FileEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("FileEntry", 7)?;
        s.serialize_field("path", &self.path)?;
        s.serialize_field("crc", &self.crc)?;
        s.serialize_field("preloadBytes", &self.preload_bytes)?;
        s.serialize_field("archiveIndex", &self.archive_index)?;
        s.serialize_field("offset", &self.offset)?;
        s.serialize_field("length", &self.length)?;
        s.serialize_field("totalSize", &self.total_size())?;
        s.end()
    }
}
