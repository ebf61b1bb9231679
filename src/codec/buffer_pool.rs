use std::collections::{HashMap, VecDeque};

const MAX_POOLED_PER_CLASS: usize = 100;

/// Size-classed pool of reusable byte buffers. Classes are powers of two;
/// a missing class falls through to a fresh allocation.
pub struct BufferPool {
    pools: HashMap<usize, VecDeque<Vec<u8>>>,
}

impl BufferPool {
    pub fn new() -> Self {
        let mut pools = HashMap::new();

        // Pre-seed the common size classes
        for size in [1024, 4096, 16384, 65536, 262144] {
            pools.insert(size, VecDeque::new());
        }

        BufferPool { pools }
    }

    pub fn get(&mut self, size: usize) -> Vec<u8> {
        let size_class = size.next_power_of_two();

        if let Some(queue) = self.pools.get_mut(&size_class) {
            if let Some(buf) = queue.pop_front() {
                return buf;
            }
        }

        Vec::with_capacity(size_class)
    }

    pub fn put(&mut self, mut buf: Vec<u8>) {
        let size_class = buf.capacity().next_power_of_two();
        buf.clear();

        let queue = self.pools.entry(size_class).or_default();
        if queue.len() < MAX_POOLED_PER_CLASS {
            queue.push_back(buf);
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returned_buffers_are_reused() {
        let mut pool = BufferPool::new();

        let mut buf = pool.get(1000);
        buf.extend_from_slice(b"payload");
        let capacity = buf.capacity();
        pool.put(buf);

        let buf = pool.get(1000);
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), capacity);
    }

    #[test]
    fn uncommon_sizes_still_allocate() {
        let mut pool = BufferPool::new();
        let buf = pool.get(3_000_000);
        assert!(buf.capacity() >= 3_000_000);
    }
}
