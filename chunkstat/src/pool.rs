use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender};

/// Bounded, best-effort cache of chunk buffers shared by the dispatcher and
/// the workers.
///
/// `acquire` never blocks: an empty pool hands out a fresh allocation.
/// `release` never blocks either: a full pool drops the buffer.
pub struct BufferPool {
    free_tx: Sender<Vec<u8>>,
    free_rx: Receiver<Vec<u8>>,
    buffer_size: usize,
    allocated: AtomicU64,
    reused: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub allocated: u64,
    pub reused: u64,
}

impl BufferPool {
    pub fn new(capacity: usize, buffer_size: usize) -> Self {
        let (free_tx, free_rx) = crossbeam_channel::bounded(capacity.max(1));
        Self {
            free_tx,
            free_rx,
            buffer_size,
            allocated: AtomicU64::new(0),
            reused: AtomicU64::new(0),
        }
    }

    pub fn acquire(&self) -> Vec<u8> {
        match self.free_rx.try_recv() {
            Ok(buffer) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                buffer
            }
            Err(_) => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                Vec::with_capacity(self.buffer_size)
            }
        }
    }

    pub fn release(&self, mut buffer: Vec<u8>) {
        buffer.clear();
        let _ = self.free_tx.try_send(buffer);
    }

    pub fn idle(&self) -> usize {
        self.free_rx.len()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocated: self.allocated.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_released_buffers() {
        let pool = BufferPool::new(2, 64);

        let mut buffer = pool.acquire();
        assert!(buffer.capacity() >= 64);
        buffer.extend_from_slice(b"Berlin;5.2\n");
        let ptr = buffer.as_ptr();
        pool.release(buffer);

        let again = pool.acquire();
        assert!(again.is_empty());
        assert_eq!(again.as_ptr(), ptr);
        assert_eq!(pool.stats(), PoolStats { allocated: 1, reused: 1 });
    }

    #[test]
    fn drops_releases_beyond_capacity() {
        let pool = BufferPool::new(1, 8);
        let first = pool.acquire();
        let second = pool.acquire();
        pool.release(first);
        pool.release(second);
        assert_eq!(pool.idle(), 1);

        let _ = pool.acquire();
        let _ = pool.acquire();
        assert_eq!(pool.stats(), PoolStats { allocated: 3, reused: 1 });
    }
}
