use std::io;
use std::path::PathBuf;

/// Errors from durable store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the backing file.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// `create` was asked to initialize a file that already exists.
    #[error("store already exists: {0}")]
    AlreadyExists(PathBuf),

    /// The file does not start with the store magic bytes.
    #[error("not an mgrep store: {0}")]
    NotAStore(PathBuf),

    /// The file was written by an incompatible format version.
    #[error("unsupported store format version {found} (expected {expected})")]
    UnsupportedVersion { expected: u32, found: u32 },

    /// The file was created for a different layout.
    #[error("layout mismatch: expected {expected:?}, found {found:?}")]
    LayoutMismatch { expected: String, found: String },

    /// Committing would grow the store past its configured capacity.
    #[error("store capacity exceeded: need {needed} bytes, capacity is {capacity} bytes")]
    CapacityExceeded { needed: u64, capacity: u64 },

    /// Another handle, in this process or another, has the store open.
    #[error("store is locked by another handle: {0}")]
    Locked(PathBuf),

    /// A record does not fit in a frame's 32-bit length field.
    #[error("record of {len} bytes exceeds the frame limit of {max} bytes")]
    FrameTooLarge { len: u64, max: u64 },

    /// The layout name is longer than the header allows.
    #[error("layout name of {len} bytes exceeds the limit of {max} bytes")]
    LayoutTooLong { len: usize, max: usize },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
