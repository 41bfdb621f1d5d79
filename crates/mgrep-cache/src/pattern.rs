use std::sync::Arc;

use mgrep_store::Transaction;
use mgrep_types::{MatchedLine, Mtime, ObjectId};
use tracing::debug;

use crate::cache::{MatchCache, PatternShared};
use crate::error::{CacheError, CacheResult};
use crate::node::{FileNode, Node};

/// Snapshot of one file record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    pub id: ObjectId,
    pub path: String,
    pub mtime: Mtime,
    /// Matches in file order.
    pub lines: Vec<MatchedLine>,
}

/// Result of a file record lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileSlot {
    pub id: ObjectId,
    /// Stored mtime; [`Mtime::UNSCANNED`] until the first scan commits.
    pub mtime: Mtime,
    /// `true` if this call created the record.
    pub created: bool,
}

/// A rescan result staged in an open transaction.
///
/// Holds the replacement line set and the new mtime for one file record as
/// a single put. Nothing is visible, in memory or on disk, until
/// [`commit`](Self::commit); dropping it discards the scan.
pub struct StagedScan<'c> {
    tx: Transaction<'c, Node>,
    id: ObjectId,
    matches: usize,
}

impl StagedScan<'_> {
    /// The file record being replaced.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Number of matched lines in the staged set.
    pub fn matches(&self) -> usize {
        self.matches
    }

    /// Publish the new lines and mtime together. Returns the commit sequence.
    pub fn commit(self) -> CacheResult<u64> {
        Ok(self.tx.commit()?)
    }
}

/// Handle on one pattern of an open [`MatchCache`].
///
/// Handles are cheap to clone and may be shared across threads; every
/// handle on the same pattern uses the same pattern-scoped lock.
#[derive(Clone)]
pub struct PatternHandle<'c> {
    cache: &'c MatchCache,
    shared: Arc<PatternShared>,
}

impl<'c> PatternHandle<'c> {
    pub(crate) fn new(cache: &'c MatchCache, shared: Arc<PatternShared>) -> Self {
        Self { cache, shared }
    }

    /// Object id of the pattern node.
    pub fn id(&self) -> ObjectId {
        self.shared.id
    }

    /// The pattern text.
    pub fn text(&self) -> &str {
        &self.shared.text
    }

    /// Number of file records under this pattern.
    pub fn file_count(&self) -> usize {
        self.shared
            .files
            .lock()
            .expect("pattern file index poisoned")
            .order
            .len()
    }

    /// Look up the record for `path`.
    pub fn find_file(&self, path: &str) -> CacheResult<Option<FileSlot>> {
        let id = self
            .shared
            .files
            .lock()
            .expect("pattern file index poisoned")
            .by_path
            .get(path)
            .copied();

        match id {
            Some(id) => Ok(Some(FileSlot {
                id,
                mtime: self.stored_mtime(id)?,
                created: false,
            })),
            None => Ok(None),
        }
    }

    /// Look up the record for `path`, creating an unscanned one if absent.
    ///
    /// Creation re-checks under the pattern lock, so racing callers on the
    /// same new path end up with a single record.
    pub fn find_or_create_file(&self, path: &str) -> CacheResult<FileSlot> {
        if let Some(slot) = self.find_file(path)? {
            return Ok(slot);
        }

        let mut files = self
            .shared
            .files
            .lock()
            .expect("pattern file index poisoned");
        if let Some(&id) = files.by_path.get(path) {
            drop(files);
            return Ok(FileSlot {
                id,
                mtime: self.stored_mtime(id)?,
                created: false,
            });
        }

        let mut tx = self.cache.store().begin();
        let id = tx.alloc(Node::File(FileNode {
            pattern: self.shared.id,
            path: path.to_string(),
            mtime: Mtime::UNSCANNED,
            lines: Vec::new(),
        }));
        tx.commit()?;
        files.insert(path.to_string(), id);
        drop(files);

        debug!(pattern = %self.shared.text, path, %id, "created file record");
        Ok(FileSlot {
            id,
            mtime: Mtime::UNSCANNED,
            created: true,
        })
    }

    /// Snapshot of the record `id`.
    pub fn file(&self, id: ObjectId) -> CacheResult<FileRecord> {
        self.cache
            .store()
            .view(id, |node| {
                let file = node.as_file(id)?;
                self.check_owner(id, file)?;
                Ok::<_, CacheError>(FileRecord {
                    id,
                    path: file.path.clone(),
                    mtime: file.mtime,
                    lines: file.lines.clone(),
                })
            })
            .ok_or(CacheError::MissingObject(id))?
    }

    /// Snapshot of the record for `path`, if any.
    pub fn file_by_path(&self, path: &str) -> CacheResult<Option<FileRecord>> {
        match self.find_file(path)? {
            Some(slot) => self.file(slot.id).map(Some),
            None => Ok(None),
        }
    }

    /// All records, most recently created first.
    pub fn files(&self) -> CacheResult<Vec<FileRecord>> {
        let ids = self
            .shared
            .files
            .lock()
            .expect("pattern file index poisoned")
            .order
            .clone();
        ids.into_iter().rev().map(|id| self.file(id)).collect()
    }

    /// Stage the replacement of record `id`'s lines and mtime.
    pub fn stage_scan(
        &self,
        id: ObjectId,
        mtime: Mtime,
        lines: Vec<MatchedLine>,
    ) -> CacheResult<StagedScan<'c>> {
        let path = self
            .cache
            .store()
            .view(id, |node| {
                let file = node.as_file(id)?;
                self.check_owner(id, file)?;
                Ok::<_, CacheError>(file.path.clone())
            })
            .ok_or(CacheError::MissingObject(id))??;

        let matches = lines.len();
        let mut tx = self.cache.store().begin();
        tx.put(
            id,
            Node::File(FileNode {
                pattern: self.shared.id,
                path,
                mtime,
                lines,
            }),
        );

        Ok(StagedScan { tx, id, matches })
    }

    /// Replace record `id`'s lines and mtime in one transaction.
    pub fn commit_scan(
        &self,
        id: ObjectId,
        mtime: Mtime,
        lines: Vec<MatchedLine>,
    ) -> CacheResult<u64> {
        self.stage_scan(id, mtime, lines)?.commit()
    }

    fn stored_mtime(&self, id: ObjectId) -> CacheResult<Mtime> {
        self.cache
            .store()
            .view(id, |node| node.as_file(id).map(|file| file.mtime))
            .ok_or(CacheError::MissingObject(id))?
    }

    fn check_owner(&self, id: ObjectId, file: &FileNode) -> CacheResult<()> {
        if file.pattern != self.shared.id {
            return Err(CacheError::NotOwned {
                file: id,
                pattern: self.shared.id,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for PatternHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternHandle")
            .field("id", &self.shared.id)
            .field("text", &self.shared.text)
            .finish()
    }
}
