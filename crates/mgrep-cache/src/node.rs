//! Persisted node types.
//!
//! Every object in a cache store is a [`Node`]. The root lists its patterns
//! explicitly. File records point back at the pattern that owns them instead
//! of the pattern listing its files: appending a file then writes one small
//! object rather than re-logging an ever-growing list. A pattern's files are
//! ordered by id, which is their creation order because ids are allocated
//! under the pattern's lock.

use mgrep_types::{MatchedLine, Mtime, ObjectId};
use serde::{Deserialize, Serialize};

use crate::error::{CacheError, CacheResult};

/// Any object stored in a cache store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Root(RootNode),
    Pattern(PatternNode),
    File(FileNode),
}

/// The single entry point, stored under [`ObjectId::ROOT`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootNode {
    /// Patterns in creation order (oldest first).
    pub patterns: Vec<ObjectId>,
}

/// A search expression. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternNode {
    pub text: String,
}

/// Cached scan result for one file under one pattern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    /// Owning pattern.
    pub pattern: ObjectId,
    pub path: String,
    /// Modification time of the revision `lines` was built from, or
    /// [`Mtime::UNSCANNED`].
    pub mtime: Mtime,
    /// Matches in file order.
    pub lines: Vec<MatchedLine>,
}

impl Node {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Root(_) => "root",
            Self::Pattern(_) => "pattern",
            Self::File(_) => "file",
        }
    }

    pub(crate) fn as_root(&self, id: ObjectId) -> CacheResult<&RootNode> {
        match self {
            Self::Root(root) => Ok(root),
            other => Err(CacheError::UnexpectedNode {
                id,
                expected: "root",
                found: other.kind(),
            }),
        }
    }

    pub(crate) fn as_pattern(&self, id: ObjectId) -> CacheResult<&PatternNode> {
        match self {
            Self::Pattern(pattern) => Ok(pattern),
            other => Err(CacheError::UnexpectedNode {
                id,
                expected: "pattern",
                found: other.kind(),
            }),
        }
    }

    pub(crate) fn as_file(&self, id: ObjectId) -> CacheResult<&FileNode> {
        match self {
            Self::File(file) => Ok(file),
            other => Err(CacheError::UnexpectedNode {
                id,
                expected: "file",
                found: other.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_check_kind() {
        let id = ObjectId::new(3);
        let node = Node::Pattern(PatternNode {
            text: "ERROR".into(),
        });
        assert_eq!(node.kind(), "pattern");
        assert_eq!(node.as_pattern(id).unwrap().text, "ERROR");
        assert!(matches!(
            node.as_file(id),
            Err(CacheError::UnexpectedNode { expected: "file", .. })
        ));
        assert!(matches!(
            node.as_root(id),
            Err(CacheError::UnexpectedNode { expected: "root", .. })
        ));
    }

    #[test]
    fn new_file_node_defaults() {
        let node = FileNode {
            pattern: ObjectId::new(1),
            path: "a.log".into(),
            mtime: Mtime::default(),
            lines: Vec::new(),
        };
        assert!(node.mtime.is_unscanned());
        assert!(node.lines.is_empty());
    }
}
