use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::Receiver;
use log::{debug, warn};
use memchr::memchr;

use crate::decode::parse_tenths;
use crate::error::{AggError, Result};
use crate::hash::fnv1a;
use crate::pool::BufferPool;
use crate::table::AggTable;

/// Folds every `<key>;<value>\n` record of `chunk` into `table`.
pub fn process_chunk(chunk: &[u8], table: &mut AggTable) -> Result<()> {
    let mut rest = chunk;

    while !rest.is_empty() {
        let line_end = memchr(b'\n', rest).unwrap_or(rest.len());
        let line = &rest[..line_end];

        let semicolon = memchr(b';', line)
            .ok_or_else(|| AggError::format(line, "missing ';' delimiter"))?;
        let key = &line[..semicolon];
        let (value, consumed) = parse_tenths(&line[semicolon + 1..])
            .map_err(|_| AggError::format(line, "value is not -?D{1,2}.D"))?;
        if semicolon + 1 + consumed != line.len() {
            return Err(AggError::format(line, "trailing bytes after value"));
        }

        table.record(fnv1a(key), key, value);

        rest = &rest[(line_end + 1).min(rest.len())..];
    }

    Ok(())
}

/// Worker loop: drain `chunks` until the dispatcher closes the queue.
///
/// Each buffer goes back to `pool` only after it has been fully scanned.
/// The table is returned to the caller through the thread's join handle.
/// A bad chunk raises `failed` so the dispatcher and the other workers stop
/// early; a worker that sees `failed` raised quits before its next chunk.
pub fn run_worker(
    id: usize,
    chunks: Receiver<Vec<u8>>,
    pool: &BufferPool,
    failed: &AtomicBool,
    table_capacity: usize,
) -> Result<AggTable> {
    let mut table = AggTable::with_capacity(table_capacity);
    let mut processed = 0u64;
    let mut warned = false;

    debug!("worker {id} started");

    for chunk in chunks.iter() {
        if failed.load(Ordering::Relaxed) {
            pool.release(chunk);
            debug!("worker {id} stopping, another stage failed");
            break;
        }

        let outcome = process_chunk(&chunk, &mut table);
        pool.release(chunk);
        if let Err(err) = outcome {
            failed.store(true, Ordering::Relaxed);
            return Err(err);
        }
        processed += 1;

        if !warned && table.is_over_capacity() {
            warn!(
                "worker {id}: {} distinct keys exceed table capacity {}",
                table.len(),
                table.capacity()
            );
            warned = true;
        }
    }

    debug!(
        "worker {id} finished: {processed} chunks, {} distinct keys",
        table.len()
    );
    Ok(table)
}
