use memmap2::{MmapMut, MmapOptions};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use crate::core::error::Result;

/// File-backed read-write byte region. The logical length always equals the
/// file length; growth keeps the extension zero-filled.
pub struct MmapRegion {
    mmap: MmapMut,
    path: PathBuf,
}

impl MmapRegion {
    /// Open (creating if necessary) the backing file, extend it to at least
    /// `min_len` bytes, and map it read-write.
    pub fn open<P: AsRef<Path>>(path: P, min_len: u64) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        let len = file.metadata()?.len();
        if len < min_len {
            file.set_len(min_len)?;
        }

        let mmap = unsafe { MmapOptions::new().map_mut(&file)? };

        Ok(MmapRegion { mmap, path })
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap[..]
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.mmap[..]
    }

    /// Offset of the first zero byte; the encoded document block occupies
    /// `[0, content_size)` and everything after it is padding.
    pub fn content_size(&self) -> usize {
        self.mmap
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.mmap.len())
    }

    pub fn flush(&self) -> Result<()> {
        self.mmap.flush()?;
        Ok(())
    }

    /// Flush, unmap, truncate the file to `new_len`, and remap. The old
    /// mapping is fully dropped before the file is resized; truncation to a
    /// larger size zero-fills the extension.
    pub fn grow(&mut self, new_len: u64) -> Result<()> {
        let old = std::mem::replace(&mut self.mmap, MmapMut::map_anon(1)?);
        old.flush()?;
        drop(old);

        let file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        file.set_len(new_len)?;
        self.mmap = unsafe { MmapOptions::new().map_mut(&file)? };

        Ok(())
    }
}
