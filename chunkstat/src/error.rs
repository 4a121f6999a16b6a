use thiserror::Error;

/// Every failure aborts the whole run; nothing here is recovered locally.
#[derive(Debug, Error)]
pub enum AggError {
    /// Open or read failure on the input.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A record that is not `<key>;<value>` with a `-?D{1,2}.D` value.
    #[error("malformed record {line:?}: {reason}")]
    Format { line: String, reason: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("worker thread {0} panicked")]
    WorkerPanicked(usize),
}

impl AggError {
    pub(crate) fn format(line: &[u8], reason: &'static str) -> Self {
        AggError::Format {
            line: String::from_utf8_lossy(line).into_owned(),
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, AggError>;
