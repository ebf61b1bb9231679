use std::time::Duration;

/// Store construction options. Passed explicitly to `Store::open`; there is
/// no process-wide configuration state.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub initial_size: u64,            // Backing file size at creation
    pub max_size: u64,                // Advisory growth ceiling, not enforced
    pub sync_interval: Duration,      // Periodic flush + GC cadence
    pub debug: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            initial_size: 32 * 1024 * 1024,    // 32MB
            max_size: 512 * 1024 * 1024,       // 512MB
            sync_interval: Duration::from_secs(60),
            debug: false,
        }
    }
}
