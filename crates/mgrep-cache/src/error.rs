//! Error types for the cache crate.

use mgrep_types::ObjectId;

/// Errors that can occur while reading or mutating the match cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The underlying store failed (I/O, capacity, corruption).
    #[error("store error: {0}")]
    Store(#[from] mgrep_store::StoreError),

    /// A node referenced by the graph is missing from the store.
    #[error("missing object in cache graph: {0}")]
    MissingObject(ObjectId),

    /// A node has the wrong kind for where it is referenced.
    #[error("object {id} is a {found} node, expected {expected}")]
    UnexpectedNode {
        id: ObjectId,
        expected: &'static str,
        found: &'static str,
    },

    /// A file record was addressed through a pattern that does not own it.
    #[error("file record {file} does not belong to pattern {pattern}")]
    NotOwned { file: ObjectId, pattern: ObjectId },

    /// The store has no root node.
    #[error("store has no root node")]
    NoRoot,
}

/// Convenience alias for cache results.
pub type CacheResult<T> = Result<T, CacheError>;
