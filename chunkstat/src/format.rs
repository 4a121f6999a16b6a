//! `{key=min/mean/max, ...}` rendering of a [`Summary`].

use std::fmt;
use std::io::{self, Write};

use crate::merge::Summary;
use crate::stats::Statistic;

/// A tenths value printed with exactly one fractional digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tenths(pub i64);

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{}", abs / 10, abs % 10)
    }
}

fn write_stat<W: Write>(out: &mut W, key: &[u8], stat: &Statistic) -> io::Result<()> {
    out.write_all(key)?;
    write!(
        out,
        "={}/{}/{}",
        Tenths(stat.min),
        Tenths(stat.mean_tenths()),
        Tenths(stat.max)
    )
}

/// Writes the whole summary as one line, including the trailing newline.
pub fn write_summary<W: Write>(out: &mut W, summary: &Summary) -> io::Result<()> {
    out.write_all(b"{")?;
    for (i, (key, stat)) in summary.iter().enumerate() {
        if i > 0 {
            out.write_all(b", ")?;
        }
        write_stat(out, key, stat)?;
    }
    out.write_all(b"}\n")
}

pub fn render(summary: &Summary) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_summary(&mut out, summary);
    String::from_utf8_lossy(&out).into_owned()
}
