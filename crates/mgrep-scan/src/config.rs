use serde::{Deserialize, Serialize};

/// Configuration for directory scans.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Number of worker threads. Always at least 1.
    pub threads: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { threads: 1 }
    }
}

impl ScanConfig {
    /// Build a config from a user-supplied thread count, clamping values
    /// below 1 to 1.
    pub fn with_threads(requested: i64) -> Self {
        Self {
            threads: usize::try_from(requested.max(1)).unwrap_or(usize::MAX),
        }
    }
}
