//! Wires the dispatcher, the worker pool and the merge together.
//!
//! The calling thread reads and dispatches; `config.workers` scoped threads
//! aggregate. Each worker hands its table back through its join handle, so
//! no table is ever shared while it is being written.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{SendError, Sender};
use log::{debug, info};

use crate::config::EngineConfig;
use crate::error::{AggError, Result};
use crate::merge::{merge, Summary};
use crate::pool::BufferPool;
use crate::progress::Progress;
use crate::reader::{self, ChunkReader};
use crate::table::AggTable;
use crate::worker::run_worker;

/// Aggregates the file at `path`.
pub fn aggregate_file<P: AsRef<Path>>(path: P, config: &EngineConfig) -> Result<Summary> {
    let file = File::open(path.as_ref())?;
    let size = file.metadata().ok().map(|meta| meta.len());
    aggregate(file, size, config)
}

/// Aggregates every record of `input`.
///
/// `total_bytes` only feeds the progress line.
pub fn aggregate<R: Read>(
    input: R,
    total_bytes: Option<u64>,
    config: &EngineConfig,
) -> Result<Summary> {
    config.validate()?;

    let started = Instant::now();
    let pool = BufferPool::new(config.pool_capacity(), reader::buffer_size(config.chunk_size));
    let failed = AtomicBool::new(false);
    let mut progress = Progress::new(config.progress, total_bytes);

    let (tables, bytes_read) = thread::scope(|scope| -> Result<(Vec<AggTable>, u64)> {
        let (chunk_tx, chunk_rx) = crossbeam_channel::bounded::<Vec<u8>>(config.queue_capacity());

        let mut handles = Vec::with_capacity(config.workers);
        for id in 0..config.workers {
            let chunks = chunk_rx.clone();
            let pool = &pool;
            let failed = &failed;
            let handle = thread::Builder::new()
                .name(format!("chunkstat-worker-{id}"))
                .spawn_scoped(scope, move || {
                    run_worker(id, chunks, pool, failed, config.table_capacity)
                })?;
            handles.push(handle);
        }
        drop(chunk_rx);

        let dispatched = dispatch(
            input,
            &pool,
            chunk_tx,
            &failed,
            config.chunk_size,
            &mut progress,
        );

        let mut tables = Vec::with_capacity(handles.len());
        let mut worker_err = None;
        for (id, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(Ok(table)) => tables.push(table),
                Ok(Err(err)) => {
                    worker_err.get_or_insert(err);
                }
                Err(_) => {
                    worker_err.get_or_insert(AggError::WorkerPanicked(id));
                }
            }
        }

        let bytes_read = dispatched?;
        match worker_err {
            Some(err) => Err(err),
            None => Ok((tables, bytes_read)),
        }
    })?;

    progress.finish(bytes_read);
    let pool_stats = pool.stats();
    debug!(
        "buffer pool: {} allocated, {} reused",
        pool_stats.allocated, pool_stats.reused
    );

    let summary = merge(tables);
    info!(
        "aggregated {} keys from {} bytes with {} workers in {:.3}s",
        summary.len(),
        bytes_read,
        config.workers,
        started.elapsed().as_secs_f64()
    );
    Ok(summary)
}

/// Feeds whole-record chunks to the workers until the input is drained.
///
/// Dropping `chunks` on return closes the queue, which is what lets the
/// workers finish. Stops early once `failed` is raised or every worker has
/// exited; a read error raises `failed` itself.
fn dispatch<R: Read>(
    input: R,
    pool: &BufferPool,
    chunks: Sender<Vec<u8>>,
    failed: &AtomicBool,
    chunk_size: usize,
    progress: &mut Progress,
) -> Result<u64> {
    let mut reader = ChunkReader::new(input, pool, chunk_size);

    loop {
        if failed.load(Ordering::Relaxed) {
            debug!("a worker failed, stopping dispatch");
            break;
        }
        let chunk = match reader.next_chunk() {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(err) => {
                failed.store(true, Ordering::Relaxed);
                return Err(err);
            }
        };
        if let Err(SendError(chunk)) = chunks.send(chunk) {
            pool.release(chunk);
            debug!("all workers exited, stopping dispatch");
            break;
        }
        progress.update(reader.bytes_read());
    }

    Ok(reader.bytes_read())
}
