use serde::{Deserialize, Serialize};

/// Default capacity of a store file: 256 MiB.
pub const DEFAULT_CAPACITY_BYTES: u64 = 256 * 1024 * 1024;

/// Flush/sync strategy for commits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMode {
    /// `fsync` after every commit. A commit that returned `Ok` survives
    /// power loss.
    #[default]
    EveryCommit,
    /// Flush to the OS page cache only. Survives a process crash but not
    /// power loss.
    OsDefault,
}

/// Configuration for a [`DurableStore`](crate::DurableStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Sync strategy for commits.
    pub sync_mode: SyncMode,
    /// Maximum size of the backing file in bytes.
    pub capacity_bytes: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sync_mode: SyncMode::default(),
            capacity_bytes: DEFAULT_CAPACITY_BYTES,
        }
    }
}

impl StoreConfig {
    /// Override the capacity.
    pub fn with_capacity(mut self, capacity_bytes: u64) -> Self {
        self.capacity_bytes = capacity_bytes;
        self
    }

    /// Override the sync mode.
    pub fn with_sync_mode(mut self, sync_mode: SyncMode) -> Self {
        self.sync_mode = sync_mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert_eq!(c.sync_mode, SyncMode::EveryCommit);
        assert_eq!(c.capacity_bytes, 256 * 1024 * 1024);
    }

    #[test]
    fn builders_override_fields() {
        let c = StoreConfig::default()
            .with_capacity(4096)
            .with_sync_mode(SyncMode::OsDefault);
        assert_eq!(c.capacity_bytes, 4096);
        assert_eq!(c.sync_mode, SyncMode::OsDefault);
    }
}
