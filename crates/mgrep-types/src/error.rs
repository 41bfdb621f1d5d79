use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("line numbers start at 1, got {0}")]
    InvalidLineNumber(u64),

    #[error("timestamp out of range: {0}")]
    TimestampOutOfRange(String),
}
