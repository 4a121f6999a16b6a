//! Grouped min/mean/max over large `<key>;<value>` files.
//!
//! The file is read sequentially and cut into chunks that end on a newline.
//! A fixed pool of worker threads folds the chunks into private fixed-bucket
//! tables, and the tables are merged into one [`Summary`] sorted by key.
//! Values are kept in integer tenths from decode to output, so the result is
//! the same for any worker count or chunk size.

pub mod baseline;
pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub mod format;
pub mod hash;
pub mod merge;
pub mod pool;
pub mod progress;
pub mod reader;
pub mod stats;
pub mod table;
pub mod worker;

pub use config::EngineConfig;
pub use engine::{aggregate, aggregate_file};
pub use error::{AggError, Result};
pub use format::{render, write_summary};
pub use merge::Summary;
pub use stats::Statistic;
