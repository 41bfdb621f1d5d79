//! The mgrep match cache.
//!
//! A [`MatchCache`] is an explicit handle on one store file. It holds the
//! persistent graph
//!
//! ```text
//! Root ──► Pattern ──► FileRecord ──► [MatchedLine]
//! ```
//!
//! and exposes the only mutations the graph allows:
//!
//! - creating a pattern (serialized by a root-scoped lock),
//! - creating a file record under a pattern (serialized by a lock scoped to
//!   that pattern, never held while a file is being read),
//! - replacing a file record's lines and mtime together in one transaction.
//!
//! Several caches can be open at once; there is no process-wide state.

pub mod cache;
pub mod error;
pub mod node;
pub mod pattern;

pub use cache::{MatchCache, LAYOUT};
pub use error::{CacheError, CacheResult};
pub use node::{FileNode, Node, PatternNode, RootNode};
pub use pattern::{FileRecord, FileSlot, PatternHandle, StagedScan};
