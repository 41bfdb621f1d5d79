use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// File modification timestamp as reported by the filesystem.
///
/// Stored as whole seconds relative to the UNIX epoch (negative before it)
/// plus a non-negative nanosecond remainder. Two `Mtime`s are compared for
/// exact equality only: there is no tolerance window and no notion of
/// "close enough".
///
/// [`Mtime::UNSCANNED`] is a sentinel that no real timestamp can equal;
/// freshly created file records carry it until their first scan commits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Mtime {
    /// Seconds since the UNIX epoch.
    pub secs: i64,
    /// Sub-second nanoseconds, always `< 1_000_000_000`.
    pub nanos: u32,
}

impl Mtime {
    /// Sentinel for "never scanned". Rejected by every constructor.
    pub const UNSCANNED: Self = Self {
        secs: i64::MIN,
        nanos: 0,
    };

    /// Build a timestamp from explicit parts.
    pub fn from_parts(secs: i64, nanos: u32) -> Result<Self, TypeError> {
        if nanos >= NANOS_PER_SEC {
            return Err(TypeError::TimestampOutOfRange(format!(
                "nanosecond component {nanos} exceeds one second"
            )));
        }
        if secs == i64::MIN {
            return Err(TypeError::TimestampOutOfRange(
                "seconds collide with the unscanned sentinel".to_string(),
            ));
        }
        Ok(Self { secs, nanos })
    }

    /// Convert a [`SystemTime`] (typically `Metadata::modified`).
    pub fn from_system_time(time: SystemTime) -> Result<Self, TypeError> {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => {
                let secs = i64::try_from(after.as_secs())
                    .map_err(|e| TypeError::TimestampOutOfRange(e.to_string()))?;
                Self::from_parts(secs, after.subsec_nanos())
            }
            Err(err) => {
                let before = err.duration();
                let mut secs = i64::try_from(before.as_secs())
                    .map(|s| -s)
                    .map_err(|e| TypeError::TimestampOutOfRange(e.to_string()))?;
                let mut nanos = before.subsec_nanos();
                if nanos > 0 {
                    secs -= 1;
                    nanos = NANOS_PER_SEC - nanos;
                }
                Self::from_parts(secs, nanos)
            }
        }
    }

    /// Returns `true` for the unscanned sentinel.
    pub fn is_unscanned(&self) -> bool {
        *self == Self::UNSCANNED
    }
}

impl Default for Mtime {
    fn default() -> Self {
        Self::UNSCANNED
    }
}

impl fmt::Debug for Mtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unscanned() {
            write!(f, "Mtime(unscanned)")
        } else {
            write!(f, "Mtime({}.{:09})", self.secs, self.nanos)
        }
    }
}

impl fmt::Display for Mtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unscanned() {
            write!(f, "unscanned")
        } else {
            write!(f, "{}.{:09}", self.secs, self.nanos)
        }
    }
}
