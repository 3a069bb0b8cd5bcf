use flate2::Crc;
use flate2::read::DeflateDecoder;
use std::io::Read;
use std::sync::Arc;

use crate::io::ReadAt;
use anyhow::{Context, Result, bail};

use super::parser::ZipParser;
use super::structures::{CompressionMethod, ZipFileEntry};

/// ZIP file extractor
pub struct ZipExtractor<R: ReadAt> {
    parser: ZipParser<R>,
}

impl<R: ReadAt> ZipExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: ZipParser::new(reader),
        }
    }

    /// List all files in the archive
    pub async fn list_files(&self) -> Result<Vec<ZipFileEntry>> {
        self.parser.list_files().await
    }

    /// Decompress an entry into memory and verify its CRC-32
    pub async fn extract_to_memory(&self, entry: &ZipFileEntry) -> Result<Vec<u8>> {
        if entry.is_encrypted() {
            bail!("Encrypted entries are not supported");
        }

        let data_offset = self.parser.get_data_offset(entry).await?;
        if data_offset
            .checked_add(entry.compressed_size)
            .is_none_or(|end| end > self.parser.size())
        {
            bail!("Entry data lies outside the archive");
        }

        let mut raw = vec![0u8; entry.compressed_size as usize];
        self.parser.reader().read_exact_at(data_offset, &mut raw).await?;

        let data = match entry.compression_method {
            CompressionMethod::Stored => raw,
            CompressionMethod::Deflate => inflate(&raw, entry.uncompressed_size)?,
            CompressionMethod::Unknown(method) => {
                bail!("Unsupported compression method: {method} (only STORED and DEFLATE are supported)")
            }
        };

        if data.len() as u64 != entry.uncompressed_size {
            bail!(
                "Size mismatch: expected {} bytes, got {}",
                entry.uncompressed_size,
                data.len()
            );
        }

        let mut crc = Crc::new();
        crc.update(&data);
        if crc.sum() != entry.crc32 {
            bail!(
                "CRC mismatch: expected {:08x}, got {:08x}",
                entry.crc32,
                crc.sum()
            );
        }

        Ok(data)
    }

    /// Extract every file entry whose name passes `filter`.
    ///
    /// Entries come back in Central Directory order, each with its own
    /// outcome so one bad entry does not hide the rest.
    pub async fn extract_matching<F>(&self, filter: F) -> Result<Vec<(ZipFileEntry, Result<Vec<u8>>)>>
    where
        F: Fn(&str) -> bool,
    {
        let entries = self.list_files().await?;
        let mut out = Vec::new();

        for entry in entries {
            if entry.is_directory || !filter(&entry.file_name) {
                continue;
            }
            let data = self.extract_to_memory(&entry).await;
            out.push((entry, data));
        }

        Ok(out)
    }
}

/// Inflate a raw DEFLATE stream, refusing to grow past the declared size
fn inflate(raw: &[u8], expected_size: u64) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    DeflateDecoder::new(raw)
        .take(expected_size.saturating_add(1))
        .read_to_end(&mut out)
        .context("Corrupt DEFLATE stream")?;
    Ok(out)
}
