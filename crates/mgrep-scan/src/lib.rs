//! Incremental scanning for mgrep.
//!
//! - [`scan_file`] brings one file's cache entry up to date, doing nothing
//!   when the stored mtime already matches.
//! - [`Dispatcher`] enumerates a directory once, splits the file list into
//!   contiguous slices and scans each slice on its own thread.
//! - [`scan_path`] picks between the two for a user-supplied path.
//!
//! Matching is pluggable through [`Matcher`]; [`RegexMatcher`] is the
//! default implementation.

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod walk;

pub use config::ScanConfig;
pub use dispatch::{partition, scan_path, Dispatcher, FileFailure, ScanReport};
pub use engine::{scan_file, ScanOutcome};
pub use error::{ScanError, ScanResult};
pub use matcher::{Matcher, RegexMatcher};
pub use walk::{enumerate, FileEntry};
