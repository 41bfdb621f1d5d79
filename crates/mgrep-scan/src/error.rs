use std::io;
use std::path::PathBuf;

use mgrep_cache::CacheError;
use mgrep_types::TypeError;

/// Errors produced while scanning.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// A regular file could not be opened or read. Affects that file only.
    #[error("unable to open file {}: {source}", .path.display())]
    Unreadable { path: PathBuf, source: io::Error },

    /// Directory traversal failed. Aborts the whole directory scan.
    #[error("cannot enumerate {}: {source}", .dir.display())]
    EnumerationFailed { dir: PathBuf, source: io::Error },

    /// The path is neither a regular file nor a directory.
    #[error("{} is not a valid input", .0.display())]
    InvalidInput(PathBuf),

    /// The pattern does not compile.
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// The filesystem reported a modification time that cannot be stored.
    #[error("unusable modification time on {}: {source}", .path.display())]
    Timestamp { path: PathBuf, source: TypeError },

    /// The OS refused to start a worker thread.
    #[error("cannot start scan worker {worker}: {source}")]
    Spawn { worker: usize, source: io::Error },

    /// The cache or its store failed.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

impl ScanError {
    /// Store, cache and thread-spawn failures end the whole operation;
    /// everything else is scoped to one file or one invocation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Cache(_) | Self::Spawn { .. })
    }
}

/// Convenience alias for scan results.
pub type ScanResult<T> = Result<T, ScanError>;
