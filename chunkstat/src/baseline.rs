//! Single-threaded reference aggregation.
//!
//! Line at a time, std hash map, std float parsing. Slow, but simple enough
//! to trust as the oracle the engine is checked against.

use std::collections::HashMap;
use std::io::BufRead;

use crate::error::{AggError, Result};
use crate::merge::Summary;
use crate::stats::Statistic;

const EXPECTED_KEYS: usize = 16 * 1024;

pub fn aggregate<R: BufRead>(mut input: R) -> Result<Summary> {
    let mut stations: HashMap<Vec<u8>, Statistic> = HashMap::with_capacity(EXPECTED_KEYS);
    let mut line = Vec::new();

    loop {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        let Some(record) = line.strip_suffix(b"\n") else {
            // Unterminated final line, same contract as the engine.
            break;
        };

        let mut fields = record.splitn(2, |byte| *byte == b';');
        let name = fields.next().unwrap_or_default();
        let value = fields
            .next()
            .ok_or_else(|| AggError::format(record, "missing ';' delimiter"))?;
        let value = std::str::from_utf8(value)
            .ok()
            .and_then(|text| text.parse::<f64>().ok())
            .ok_or_else(|| AggError::format(record, "value is not a number"))?;
        let tenths = (value * 10.0).round() as i64;

        match stations.get_mut(name) {
            Some(stat) => stat.observe(tenths),
            None => {
                stations.insert(name.to_vec(), Statistic::new(tenths));
            }
        }
    }

    let mut summary = Summary::new();
    for (name, stat) in stations {
        summary.absorb(name.into_boxed_slice(), stat);
    }
    Ok(summary)
}
