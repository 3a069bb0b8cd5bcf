//! Shared builders for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use flate2::Compression;
use flate2::write::DeflateEncoder;
use flate2::Crc;
use std::io::Write;

/// One directory tree entry to encode
#[derive(Debug, Clone)]
pub struct TestEntry {
    pub extension: &'static str,
    pub path: &'static str,
    pub filename: &'static str,
    pub crc: u32,
    pub preload: Vec<u8>,
    pub archive_index: u16,
    pub offset: u32,
    pub length: u32,
    pub terminator: u16,
}

impl TestEntry {
    pub fn new(extension: &'static str, path: &'static str, filename: &'static str) -> Self {
        Self {
            extension,
            path,
            filename,
            crc: 0xCAFE_F00D,
            preload: Vec::new(),
            archive_index: 0,
            offset: 0,
            length: 0,
            terminator: 0xFFFF,
        }
    }

    pub fn data(mut self, archive_index: u16, offset: u32, length: u32) -> Self {
        self.archive_index = archive_index;
        self.offset = offset;
        self.length = length;
        self
    }

    pub fn preload(mut self, bytes: &[u8]) -> Self {
        self.preload = bytes.to_vec();
        self
    }

    pub fn crc(mut self, crc: u32) -> Self {
        self.crc = crc;
        self
    }

    pub fn terminator(mut self, terminator: u16) -> Self {
        self.terminator = terminator;
        self
    }
}

/// Writes VPK directory files.
///
/// Entries sharing an extension and path are grouped into one tree branch
/// in first-seen order, which is the order a decoder reports them in.
pub struct VpkBuilder {
    version: u32,
    entries: Vec<TestEntry>,
}

impl VpkBuilder {
    pub fn new(version: u32) -> Self {
        Self {
            version,
            entries: Vec::new(),
        }
    }

    pub fn entry(mut self, entry: TestEntry) -> Self {
        self.entries.push(entry);
        self
    }

    fn tree(&self) -> Vec<u8> {
        let mut extensions: Vec<&str> = Vec::new();
        for e in &self.entries {
            if !extensions.contains(&e.extension) {
                extensions.push(e.extension);
            }
        }

        let mut tree = Vec::new();
        for ext in extensions {
            put_str(&mut tree, ext);

            let mut paths: Vec<&str> = Vec::new();
            for e in self.entries.iter().filter(|e| e.extension == ext) {
                if !paths.contains(&e.path) {
                    paths.push(e.path);
                }
            }

            for path in paths {
                put_str(&mut tree, path);
                for e in self
                    .entries
                    .iter()
                    .filter(|e| e.extension == ext && e.path == path)
                {
                    put_str(&mut tree, e.filename);
                    tree.extend_from_slice(&e.crc.to_le_bytes());
                    tree.extend_from_slice(&(e.preload.len() as u16).to_le_bytes());
                    tree.extend_from_slice(&e.archive_index.to_le_bytes());
                    tree.extend_from_slice(&e.offset.to_le_bytes());
                    tree.extend_from_slice(&e.length.to_le_bytes());
                    tree.extend_from_slice(&e.terminator.to_le_bytes());
                    tree.extend_from_slice(&e.preload);
                }
                tree.push(0);
            }
            tree.push(0);
        }
        tree.push(0);
        tree
    }

    pub fn build(&self) -> Vec<u8> {
        let tree = self.tree();
        let mut out = Vec::new();
        out.extend_from_slice(&0x55AA1234u32.to_le_bytes());
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&(tree.len() as u32).to_le_bytes());
        if self.version == 2 {
            for section in [0u32, 0, 48, 0] {
                out.extend_from_slice(&section.to_le_bytes());
            }
        }
        out.extend_from_slice(&tree);
        out
    }
}

fn put_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(s.as_bytes());
    out.push(0);
}

/// Central Directory facts for one entry, written out by `build`
struct CentralRecord {
    name: String,
    method: u16,
    crc: u32,
    compressed_size: u32,
    uncompressed_size: u32,
    lfh_offset: u32,
}

/// Writes ZIP containers with STORED or DEFLATE entries.
///
/// With [`zip64`](Self::zip64) the Central Directory headers saturate their
/// size and offset fields and carry the real values in a 0x0001 extra
/// field, and the EOCD points at a ZIP64 EOCD through a locator.
pub struct ZipBuilder {
    data: Vec<u8>,
    records: Vec<CentralRecord>,
    comment: Vec<u8>,
    zip64: bool,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            records: Vec::new(),
            comment: Vec::new(),
            zip64: false,
        }
    }

    pub fn stored(self, name: &str, content: &[u8]) -> Self {
        self.add(name, content, 0, content.to_vec(), None)
    }

    pub fn deflated(self, name: &str, content: &[u8]) -> Self {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content).unwrap();
        let packed = encoder.finish().unwrap();
        self.add(name, content, 8, packed, None)
    }

    pub fn with_method(self, name: &str, content: &[u8], method: u16) -> Self {
        self.add(name, content, method, content.to_vec(), None)
    }

    /// Stored entry whose recorded CRC does not match its content
    pub fn stored_bad_crc(self, name: &str, content: &[u8]) -> Self {
        self.add(name, content, 0, content.to_vec(), Some(0x0BAD_0BAD))
    }

    pub fn directory(self, name: &str) -> Self {
        self.add(name, b"", 0, Vec::new(), None)
    }

    pub fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    pub fn zip64(mut self) -> Self {
        self.zip64 = true;
        self
    }

    fn add(mut self, name: &str, content: &[u8], method: u16, packed: Vec<u8>, crc_override: Option<u32>) -> Self {
        let mut crc = Crc::new();
        crc.update(content);
        let crc = crc_override.unwrap_or(crc.sum());
        let lfh_offset = self.data.len() as u32;

        // Local File Header
        self.data.extend_from_slice(b"PK\x03\x04");
        self.data.extend_from_slice(&20u16.to_le_bytes());
        self.data.extend_from_slice(&0u16.to_le_bytes());
        self.data.extend_from_slice(&method.to_le_bytes());
        self.data.extend_from_slice(&[0, 0, 0x21, 0x00]);
        self.data.extend_from_slice(&crc.to_le_bytes());
        self.data.extend_from_slice(&(packed.len() as u32).to_le_bytes());
        self.data.extend_from_slice(&(content.len() as u32).to_le_bytes());
        self.data.extend_from_slice(&(name.len() as u16).to_le_bytes());
        self.data.extend_from_slice(&0u16.to_le_bytes());
        self.data.extend_from_slice(name.as_bytes());
        self.data.extend_from_slice(&packed);

        self.records.push(CentralRecord {
            name: name.to_string(),
            method,
            crc,
            compressed_size: packed.len() as u32,
            uncompressed_size: content.len() as u32,
            lfh_offset,
        });
        self
    }

    fn central_header(&self, out: &mut Vec<u8>, record: &CentralRecord) {
        let (compressed, uncompressed, offset) = if self.zip64 {
            (0xFFFF_FFFF, 0xFFFF_FFFF, 0xFFFF_FFFF)
        } else {
            (record.compressed_size, record.uncompressed_size, record.lfh_offset)
        };
        let extra_len: u16 = if self.zip64 { 4 + 24 } else { 0 };

        out.extend_from_slice(b"PK\x01\x02");
        out.extend_from_slice(&45u16.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&record.method.to_le_bytes());
        out.extend_from_slice(&[0, 0, 0x21, 0x00]);
        out.extend_from_slice(&record.crc.to_le_bytes());
        out.extend_from_slice(&compressed.to_le_bytes());
        out.extend_from_slice(&uncompressed.to_le_bytes());
        out.extend_from_slice(&(record.name.len() as u16).to_le_bytes());
        out.extend_from_slice(&extra_len.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(record.name.as_bytes());

        if self.zip64 {
            // Uncompressed size, compressed size, LFH offset
            out.extend_from_slice(&0x0001u16.to_le_bytes());
            out.extend_from_slice(&24u16.to_le_bytes());
            out.extend_from_slice(&(record.uncompressed_size as u64).to_le_bytes());
            out.extend_from_slice(&(record.compressed_size as u64).to_le_bytes());
            out.extend_from_slice(&(record.lfh_offset as u64).to_le_bytes());
        }
    }

    pub fn build(self) -> Vec<u8> {
        let mut central = Vec::new();
        for record in &self.records {
            self.central_header(&mut central, record);
        }

        let mut out = self.data;
        let cd_offset = out.len() as u64;
        let cd_size = central.len() as u64;
        let count = self.records.len() as u64;
        out.extend_from_slice(&central);

        let (eocd_count, eocd_size, eocd_offset) = if self.zip64 {
            let eocd64_offset = out.len() as u64;

            // ZIP64 End of Central Directory
            out.extend_from_slice(b"PK\x06\x06");
            out.extend_from_slice(&44u64.to_le_bytes());
            out.extend_from_slice(&45u16.to_le_bytes());
            out.extend_from_slice(&45u16.to_le_bytes());
            out.extend_from_slice(&0u32.to_le_bytes());
            out.extend_from_slice(&0u32.to_le_bytes());
            out.extend_from_slice(&count.to_le_bytes());
            out.extend_from_slice(&count.to_le_bytes());
            out.extend_from_slice(&cd_size.to_le_bytes());
            out.extend_from_slice(&cd_offset.to_le_bytes());

            // ZIP64 EOCD locator
            out.extend_from_slice(b"PK\x06\x07");
            out.extend_from_slice(&0u32.to_le_bytes());
            out.extend_from_slice(&eocd64_offset.to_le_bytes());
            out.extend_from_slice(&1u32.to_le_bytes());

            (0xFFFF, 0xFFFF_FFFF, 0xFFFF_FFFF)
        } else {
            (count as u16, cd_size as u32, cd_offset as u32)
        };

        out.extend_from_slice(b"PK\x05\x06");
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&eocd_count.to_le_bytes());
        out.extend_from_slice(&eocd_count.to_le_bytes());
        out.extend_from_slice(&eocd_size.to_le_bytes());
        out.extend_from_slice(&eocd_offset.to_le_bytes());
        out.extend_from_slice(&(self.comment.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.comment);
        out
    }
}
