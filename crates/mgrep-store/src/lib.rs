//! Crash-consistent object store for mgrep.
//!
//! A [`DurableStore`] keeps a map of [`ObjectId`] to typed objects in memory
//! and persists every change as one framed record in a single backing file.
//! The file is the only source of truth: opening it replays the records in
//! order and rebuilds the same map.
//!
//! # Guarantees
//!
//! 1. A [`Transaction`] is all-or-nothing. Its operations are written as one
//!    CRC-protected frame; a frame that is torn by a crash is discarded on
//!    recovery together with everything after it.
//! 2. Readers never observe half of a commit. Committed operations are
//!    applied to the in-memory view under a single write lock.
//! 3. Dropping an uncommitted transaction rolls it back. Nothing was written.
//! 4. Allocated ids are never reused by committed data.
//! 5. Compaction replaces the file atomically (write to a temporary file,
//!    sync, rename).
//!
//! [`ObjectId`]: mgrep_types::ObjectId

pub mod config;
pub mod error;
mod format;
pub mod store;
pub mod transaction;

pub use config::{StoreConfig, SyncMode};
pub use error::{StoreError, StoreResult};
pub use store::{DurableStore, StoreStats};
pub use transaction::{Op, Transaction};
