use chrono::Utc;
use crossbeam::channel::{unbounded, Receiver, Sender};
use crossbeam::select;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::codec::encoder::DocumentCodec;
use crate::core::config::StoreOptions;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::StoreStats;
use crate::core::types::{Entry, Value};
use crate::index::manager::{IndexManager, IndexType};
use crate::mmap::region::MmapRegion;

/// Map, mmap region, and dirty flag live under one reader/writer lock:
/// readers see either the state before or after a mutation, never between.
pub(crate) struct StoreInner {
    pub(crate) data: HashMap<String, Entry>,
    pub(crate) region: Option<MmapRegion>,
    pub(crate) dirty: bool,
}

/// Memory-mapped document store. The in-memory map is the source of truth;
/// the mmap region mirrors it at every periodic sync, growing the backing
/// file by doubling when the encoded map outgrows it.
pub struct Store {
    path: PathBuf,
    options: StoreOptions,
    codec: DocumentCodec,
    pub(crate) indexes: IndexManager,
    pub(crate) inner: RwLock<StoreInner>,
    pub(crate) stats: Mutex<StoreStats>,

    /// Keys found expired by `get`, drained by the maintenance thread.
    cleanup_tx: Sender<String>,
    cleanup_rx: Receiver<String>,

    shutdown_tx: Sender<()>,
    maintenance: Mutex<Option<JoinHandle<()>>>,
}

impl Store {
    /// Open the store at `path`, loading any previously synced content and
    /// starting the periodic sync/GC thread.
    pub fn open<P: AsRef<Path>>(path: P, options: StoreOptions) -> Result<Arc<Self>> {
        let path = path.as_ref().to_path_buf();
        let region = MmapRegion::open(&path, options.initial_size)?;
        let codec = DocumentCodec::new();
        let indexes = IndexManager::new();

        let mut data = HashMap::new();
        let content_size = region.content_size();
        if content_size > 0 {
            let decoded = codec.decode(&region.as_bytes()[..content_size])?;
            let now = Utc::now().timestamp();
            for (key, entry) in &decoded {
                if entry.is_expired(now) {
                    continue;
                }
                indexes.update(key, &entry.value)?;
            }
            data = decoded;
        }

        let mut stats = StoreStats::default();
        stats.data_size = content_size as u64;
        stats.entry_count = data.len() as u64;
        stats.file_size = region.len() as u64;

        let (cleanup_tx, cleanup_rx) = unbounded();
        let (shutdown_tx, shutdown_rx) = unbounded();

        let store = Arc::new(Store {
            path,
            options,
            codec,
            indexes,
            inner: RwLock::new(StoreInner {
                data,
                region: Some(region),
                dirty: false,
            }),
            stats: Mutex::new(stats),
            cleanup_tx,
            cleanup_rx,
            shutdown_tx,
            maintenance: Mutex::new(None),
        });

        let weak = Arc::downgrade(&store);
        let interval = store.options.sync_interval;
        let handle = std::thread::spawn(move || maintenance_loop(weak, shutdown_rx, interval));
        *store.maintenance.lock() = Some(handle);

        Ok(store)
    }

    /// Look up the current entry. An entry found expired is reported absent
    /// and queued for deletion by the maintenance thread.
    pub fn get(&self, key: &str) -> Option<Entry> {
        let start = Instant::now();

        let result = {
            let inner = self.inner.read();
            match inner.data.get(key) {
                Some(entry) if entry.is_expired(Utc::now().timestamp()) => {
                    let _ = self.cleanup_tx.send(key.to_string());
                    None
                }
                Some(entry) => Some(entry.clone()),
                None => None,
            }
        };

        self.stats.lock().record_read(start.elapsed());
        result
    }

    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        self.put(key, value, 0)
    }

    pub fn set_with_ttl(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        self.put(key, value, ttl.as_secs() as i64)
    }

    fn put(&self, key: &str, value: Value, ttl_secs: i64) -> Result<()> {
        let start = Instant::now();

        let mut inner = self.inner.write();
        let entry = if ttl_secs > 0 {
            Entry::with_ttl(value, ttl_secs)
        } else {
            Entry::new(value)
        };
        inner.data.insert(key.to_string(), entry);
        inner.dirty = true;

        // Indexes are brought up to date before the write lock is released,
        // so no later search can miss this document. The entry stays in the
        // map even when indexing fails.
        let indexed = self.indexes.update(key, &inner.data[key].value);
        let entry_count = inner.data.len();
        drop(inner);

        self.stats.lock().record_write(start.elapsed(), entry_count);
        indexed
    }

    /// Remove a key from the map and every index. No-op when absent.
    pub fn delete(&self, key: &str) {
        let mut inner = self.inner.write();

        if inner.data.remove(key).is_some() {
            inner.dirty = true;
            self.indexes.remove(key);
            let entry_count = inner.data.len();
            drop(inner);

            let mut stats = self.stats.lock();
            stats.deletes += 1;
            stats.entry_count = entry_count as u64;
        }
    }

    pub fn create_index(&self, field: &str, kind: IndexType) {
        self.indexes.add_index(field, kind);
    }

    /// Create a vector index with an explicit dimension instead of the
    /// default 384.
    pub fn create_vector_index(&self, field: &str, dim: usize) {
        self.indexes.add_vector_index(field, dim);
    }

    pub fn remove_index(&self, field: &str, kind: IndexType) -> Result<()> {
        self.indexes.remove_index(field, kind)
    }

    /// Flush the current live entries to the mmap region. No-op when the
    /// in-memory state has not diverged from the on-disk bytes.
    pub fn sync(&self) -> Result<()> {
        let mut inner = self.inner.write();
        self.sync_locked(&mut inner)
    }

    fn sync_locked(&self, inner: &mut StoreInner) -> Result<()> {
        if !inner.dirty {
            return Ok(());
        }

        let buf = {
            let now = Utc::now().timestamp();
            let clean: HashMap<&String, &Entry> = inner
                .data
                .iter()
                .filter(|(_, entry)| !entry.is_expired(now))
                .collect();
            self.codec.encode(&clean)?
        };

        let region = inner.region.as_mut().ok_or_else(|| {
            Error::new(ErrorKind::InvalidState, "store is closed")
        })?;

        if buf.len() > region.len() {
            let required = buf.len() as u64;
            let mut new_len = (region.len() as u64)
                .max(self.options.initial_size)
                .max(4096);
            while new_len < required {
                new_len *= 2;
            }

            if new_len > self.options.max_size {
                tracing::warn!(
                    new_len,
                    max_size = self.options.max_size,
                    "backing file growing past the advisory maximum"
                );
            }
            region.grow(new_len)?;
        }

        let bytes = region.as_bytes_mut();
        bytes[..buf.len()].copy_from_slice(&buf);
        bytes[buf.len()..].fill(0);
        region.flush()?;
        let file_size = region.len() as u64;

        inner.dirty = false;
        let entry_count = inner.data.len() as u64;
        let data_size = buf.len() as u64;
        self.codec.recycle(buf);

        let mut stats = self.stats.lock();
        stats.data_size = data_size;
        stats.file_size = file_size;
        stats.entry_count = entry_count;

        Ok(())
    }

    /// Snapshot of the current statistics.
    pub fn get_stats(&self) -> StoreStats {
        let inner = self.inner.read();
        let entry_count = inner.data.len() as u64;
        let file_size = inner.region.as_ref().map_or(0, |r| r.len() as u64);
        drop(inner);

        let index_stats = self.indexes.stats();

        let mut stats = self.stats.lock();
        stats.entry_count = entry_count;
        stats.file_size = file_size;
        stats.index_stats = index_stats;
        stats.clone()
    }

    /// Stop the maintenance thread, run a final sync, and unmap. Idempotent;
    /// operations needing the region fail with `InvalidState` afterwards.
    pub fn close(&self) -> Result<()> {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.maintenance.lock().take() {
            let _ = handle.join();
        }

        let mut inner = self.inner.write();
        if inner.region.is_none() {
            return Ok(());
        }

        self.sync_locked(&mut inner)?;
        if let Some(region) = inner.region.take() {
            region.flush()?;
        }

        Ok(())
    }

    /// One periodic cycle: timed sync, then expired-key cleanup.
    fn run_maintenance(&self) {
        let start = Instant::now();
        if let Err(err) = self.sync() {
            tracing::warn!(error = %err, "periodic sync failed, state stays dirty");
        }

        let elapsed = start.elapsed();
        let file_size = self
            .inner
            .read()
            .region
            .as_ref()
            .map_or(0, |r| r.len() as u64);
        self.stats.lock().record_sync(elapsed, file_size);

        self.drain_cleanup();
        self.gc_expired();

        if self.options.debug {
            tracing::debug!(path = %self.path.display(), took_ms = elapsed.as_millis() as u64, "maintenance cycle");
        }
    }

    fn drain_cleanup(&self) {
        while let Ok(key) = self.cleanup_rx.try_recv() {
            self.delete(&key);
        }
    }

    /// Remove every expired entry from the map and the indexes.
    fn gc_expired(&self) {
        let mut inner = self.inner.write();
        let now = Utc::now().timestamp();

        let expired: Vec<String> = inner
            .data
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        if expired.is_empty() {
            return;
        }

        for key in &expired {
            inner.data.remove(key);
            self.indexes.remove(key);
        }
        inner.dirty = true;
        let entry_count = inner.data.len() as u64;
        drop(inner);

        let mut stats = self.stats.lock();
        stats.expired_count += expired.len() as u64;
        stats.entry_count = entry_count;
        stats.performance_stats.last_gc = Some(Utc::now());
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
    }
}

fn maintenance_loop(store: Weak<Store>, shutdown: Receiver<()>, interval: Duration) {
    let ticker = crossbeam::channel::tick(interval);

    loop {
        select! {
            recv(ticker) -> _ => {
                match store.upgrade() {
                    Some(store) => store.run_maintenance(),
                    None => return,
                }
            }
            recv(shutdown) -> _ => return,
        }
    }
}
