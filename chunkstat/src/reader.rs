//! Sequential reader that cuts the input into whole-record chunks.

use std::io::Read;

use log::warn;

use crate::error::Result;
use crate::pool::BufferPool;

/// Spare room in each pooled buffer for the carried-over partial line.
pub const CARRY_HEADROOM: usize = 1024;

/// Pool buffer size that fits one fill plus a typical carry without
/// reallocating.
pub fn buffer_size(chunk_size: usize) -> usize {
    chunk_size.max(1) + CARRY_HEADROOM
}

/// Carves `input` into pooled buffers that each end on a `\n`.
///
/// Bytes after the last newline of a fill are carried into the next buffer,
/// so no record ever spans two chunks. A line longer than `chunk_size`
/// keeps growing the carry until its newline shows up.
pub struct ChunkReader<'a, R> {
    input: R,
    pool: &'a BufferPool,
    carry: Vec<u8>,
    chunk_size: usize,
    bytes_read: u64,
    eof: bool,
}

impl<'a, R: Read> ChunkReader<'a, R> {
    pub fn new(input: R, pool: &'a BufferPool, chunk_size: usize) -> Self {
        Self {
            input,
            pool,
            carry: Vec::new(),
            chunk_size: chunk_size.max(1),
            bytes_read: 0,
            eof: false,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Next chunk of complete records, or `None` once the input is drained.
    pub fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            if self.eof {
                if !self.carry.is_empty() {
                    warn!(
                        "dropping {} trailing bytes without a terminating newline",
                        self.carry.len()
                    );
                    self.carry.clear();
                }
                return Ok(None);
            }

            let mut buffer = self.pool.acquire();
            buffer.extend_from_slice(&self.carry);
            self.carry.clear();
            if let Err(err) = self.fill(&mut buffer) {
                self.pool.release(buffer);
                return Err(err);
            }

            match memchr::memrchr(b'\n', &buffer) {
                Some(last) => {
                    self.carry.extend_from_slice(&buffer[last + 1..]);
                    buffer.truncate(last + 1);
                    return Ok(Some(buffer));
                }
                None => {
                    self.carry.extend_from_slice(&buffer);
                    self.pool.release(buffer);
                }
            }
        }
    }

    /// Appends up to `chunk_size` bytes from the input into the buffer's
    /// spare capacity.
    fn fill(&mut self, buffer: &mut Vec<u8>) -> Result<()> {
        let start = buffer.len();
        let limit = self.chunk_size as u64;

        let result = (&mut self.input).take(limit).read_to_end(buffer);
        let read = buffer.len() - start;
        self.bytes_read += read as u64;
        result?;

        if (read as u64) < limit {
            self.eof = true;
        }
        Ok(())
    }
}
