use std::time::Duration;
use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};

/// EWMA smoothing factor for latency tracking.
const ALPHA: f64 = 0.1;

fn ewma(current: f64, sample_ms: f64) -> f64 {
    ALPHA * sample_ms + (1.0 - ALPHA) * current
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Store statistics for monitoring, returned as a snapshot by `get_stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStats {
    // Basic operations
    pub reads: u64,
    pub writes: u64,
    pub deletes: u64,
    pub sync_count: u64,
    pub last_sync_time: Option<DateTime<Utc>>,

    // Storage
    pub data_size: u64,      // Encoded size of the document map
    pub file_size: u64,      // Length of the mmap backing file
    pub entry_count: u64,    // Entries currently in the map
    pub expired_count: u64,  // Entries removed by GC so far

    pub index_stats: IndexStats,
    pub performance_stats: PerformanceStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    pub text_indexes: IndexFamilyStats,
    pub vector_indexes: IndexFamilyStats,
    pub ordered_indexes: IndexFamilyStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexFamilyStats {
    pub count: usize,
    pub entry_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub avg_read_latency_ms: f64,
    pub avg_write_latency_ms: f64,
    pub avg_sync_latency_ms: f64,
    pub last_gc: Option<DateTime<Utc>>,
}

impl StoreStats {
    pub fn record_read(&mut self, duration: Duration) {
        let perf = &mut self.performance_stats;
        perf.avg_read_latency_ms = ewma(perf.avg_read_latency_ms, millis(duration));
        self.reads += 1;
    }

    pub fn record_write(&mut self, duration: Duration, entry_count: usize) {
        let perf = &mut self.performance_stats;
        perf.avg_write_latency_ms = ewma(perf.avg_write_latency_ms, millis(duration));
        self.writes += 1;
        self.entry_count = entry_count as u64;
    }

    pub fn record_sync(&mut self, duration: Duration, file_size: u64) {
        let perf = &mut self.performance_stats;
        perf.avg_sync_latency_ms = ewma(perf.avg_sync_latency_ms, millis(duration));
        self.last_sync_time = Some(Utc::now());
        self.sync_count += 1;
        self.file_size = file_size;
    }
}
