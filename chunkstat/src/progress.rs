use std::time::{Duration, Instant};

use log::info;

const REPORT_INTERVAL: Duration = Duration::from_secs(1);
const MIB: f64 = 1024.0 * 1024.0;

/// Throttled progress lines for the dispatcher, logged at `info`.
pub struct Progress {
    enabled: bool,
    total_bytes: Option<u64>,
    started: Instant,
    last_report: Instant,
}

impl Progress {
    pub fn new(enabled: bool, total_bytes: Option<u64>) -> Self {
        let now = Instant::now();
        Self {
            enabled,
            total_bytes,
            started: now,
            last_report: now,
        }
    }

    pub fn update(&mut self, bytes_read: u64) {
        if !self.enabled || self.last_report.elapsed() < REPORT_INTERVAL {
            return;
        }
        self.last_report = Instant::now();
        info!("{}", self.line(bytes_read));
    }

    pub fn finish(&self, bytes_read: u64) {
        if self.enabled {
            info!("done: {}", self.line(bytes_read));
        }
    }

    fn line(&self, bytes_read: u64) -> String {
        let elapsed = self.started.elapsed().as_secs_f64();
        let throughput = if elapsed > 0.0 {
            bytes_read as f64 / MIB / elapsed
        } else {
            0.0
        };
        match self.total_bytes {
            Some(total) if total > 0 => format!(
                "{elapsed:.1}s {:.1}% {throughput:.1} MiB/s",
                bytes_read as f64 * 100.0 / total as f64
            ),
            _ => format!(
                "{elapsed:.1}s {:.1} MiB {throughput:.1} MiB/s",
                bytes_read as f64 / MIB
            ),
        }
    }
}
