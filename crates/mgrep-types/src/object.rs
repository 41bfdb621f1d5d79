use std::fmt;

use serde::{Deserialize, Serialize};

/// Durable identifier for an object in the store.
///
/// Ids are allocated monotonically by the store and never reused, so an
/// `ObjectId` stays valid for as long as the object it names is alive.
/// Id `0` is reserved for the store root.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u64);

impl ObjectId {
    /// The well-known root object.
    pub const ROOT: Self = Self(0);

    /// Wrap a raw id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric id.
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Returns `true` if this is the root object id.
    pub fn is_root(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}", self.0)
    }
}
