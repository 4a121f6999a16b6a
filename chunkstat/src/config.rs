use std::thread;

use crate::error::{AggError, Result};

pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;
pub const DEFAULT_FAN_OUT: usize = 4;
pub const DEFAULT_TABLE_CAPACITY: usize = 16 * 1024;

/// Tuning knobs for one engine run.
///
/// `queue_capacity() * chunk_size` bounds the bytes in flight between the
/// dispatcher and the workers. The buffer pool keeps up to
/// `workers * pool_fan_out` idle buffers around for reuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub workers: usize,
    pub chunk_size: usize,
    /// Explicit queue length; `None` means `workers * pool_fan_out`.
    pub queue_capacity: Option<usize>,
    pub pool_fan_out: usize,
    /// Bucket count of each worker's table. Must be a power of two.
    pub table_capacity: usize,
    pub progress: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Self {
            workers,
            chunk_size: DEFAULT_CHUNK_SIZE,
            queue_capacity: None,
            pool_fan_out: DEFAULT_FAN_OUT,
            table_capacity: DEFAULT_TABLE_CAPACITY,
            progress: false,
        }
    }
}

impl EngineConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = Some(queue_capacity);
        self
    }

    pub fn with_table_capacity(mut self, table_capacity: usize) -> Self {
        self.table_capacity = table_capacity;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn pool_capacity(&self) -> usize {
        self.workers * self.pool_fan_out
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity.unwrap_or_else(|| self.pool_capacity())
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(AggError::InvalidConfig("workers must be > 0".into()));
        }
        if self.chunk_size == 0 {
            return Err(AggError::InvalidConfig("chunk_size must be > 0".into()));
        }
        if self.queue_capacity() == 0 {
            return Err(AggError::InvalidConfig(
                "queue_capacity must be > 0".into(),
            ));
        }
        if !self.table_capacity.is_power_of_two() {
            return Err(AggError::InvalidConfig(format!(
                "table_capacity must be a power of two, got {}",
                self.table_capacity
            )));
        }
        Ok(())
    }
}
