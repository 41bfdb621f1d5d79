//! Foundation types for mgrep.
//!
//! Every other mgrep crate depends on `mgrep-types`. The types here are plain
//! values: they carry no I/O and are safe to persist with any serde format.
//!
//! # Key Types
//!
//! - [`Mtime`]: File modification timestamp with an "unscanned" sentinel
//! - [`ObjectId`]: Durable identifier allocated by the object store
//! - [`MatchedLine`]: One matching source line and its 1-based number

pub mod error;
pub mod line;
pub mod object;
pub mod temporal;

pub use error::TypeError;
pub use line::MatchedLine;
pub use object::ObjectId;
pub use temporal::Mtime;
