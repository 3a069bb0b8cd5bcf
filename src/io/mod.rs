mod local;
mod memory;

pub use local::LocalFileReader;
pub use memory::MemoryReader;

use anyhow::{Result, bail};
use async_trait::async_trait;

/// Trait for random access reading from a data source
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read data at the specified offset into the buffer
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;

    /// Fill `buf` completely from `offset`, failing on a short read
    async fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let end = offset.checked_add(buf.len() as u64);
        if end.is_none_or(|end| end > self.size()) {
            bail!(
                "Read of {} bytes at offset {} exceeds source size {}",
                buf.len(),
                offset,
                self.size()
            );
        }

        let mut filled = 0;
        while filled < buf.len() {
            let n = self
                .read_at(offset + filled as u64, &mut buf[filled..])
                .await?;
            if n == 0 {
                bail!("Unexpected end of data at offset {}", offset + filled as u64);
            }
            filled += n;
        }
        Ok(())
    }

    /// Materialize the whole source in memory
    async fn read_all(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.size() as usize];
        self.read_exact_at(0, &mut buf).await?;
        Ok(buf)
    }
}
