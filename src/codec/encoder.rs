use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use crate::codec::buffer_pool::BufferPool;
use crate::core::error::Result;
use crate::core::types::Entry;

/// Encodes the document map into a self-delimited byte block and decodes it
/// back. The block is JSON: it never contains a zero byte (control characters
/// are escaped), so the first NUL in the mmap bounds the content.
///
/// Scratch buffers are pooled; callers hand them back with `recycle` once the
/// bytes have been copied out.
pub struct DocumentCodec {
    pool: Mutex<BufferPool>,
}

impl DocumentCodec {
    pub fn new() -> Self {
        DocumentCodec {
            pool: Mutex::new(BufferPool::new()),
        }
    }

    pub fn encode<T: Serialize>(&self, data: &T) -> Result<Vec<u8>> {
        let mut buf = self.pool.lock().get(4096);
        serde_json::to_writer(&mut buf, data)?;
        Ok(buf)
    }

    pub fn recycle(&self, buf: Vec<u8>) {
        self.pool.lock().put(buf);
    }

    /// Strict decode: unknown fields on entries are rejected so on-disk
    /// corruption surfaces at load time instead of as silent data loss.
    pub fn decode(&self, bytes: &[u8]) -> Result<HashMap<String, Entry>> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl Default for DocumentCodec {
    fn default() -> Self {
        Self::new()
    }
}
