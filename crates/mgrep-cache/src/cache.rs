use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use mgrep_store::{DurableStore, StoreConfig, StoreStats};
use mgrep_types::ObjectId;
use tracing::{debug, info, warn};

use crate::error::{CacheError, CacheResult};
use crate::node::{Node, PatternNode, RootNode};
use crate::pattern::PatternHandle;

/// Layout name written into every cache store header.
pub const LAYOUT: &str = "mgrep";

/// In-memory index of one pattern's file records.
#[derive(Debug, Default)]
pub(crate) struct FileIndex {
    /// File record ids in creation order.
    pub(crate) order: Vec<ObjectId>,
    pub(crate) by_path: HashMap<String, ObjectId>,
}

impl FileIndex {
    pub(crate) fn insert(&mut self, path: String, id: ObjectId) {
        self.order.push(id);
        self.by_path.insert(path, id);
    }
}

/// State shared by every handle on the same pattern.
///
/// `files` is the pattern-scoped lock: it guards the structural insert of a
/// new file record and nothing else.
#[derive(Debug)]
pub(crate) struct PatternShared {
    pub(crate) id: ObjectId,
    pub(crate) text: String,
    pub(crate) files: Mutex<FileIndex>,
}

#[derive(Default)]
struct Registry {
    /// Patterns in creation order.
    order: Vec<Arc<PatternShared>>,
    by_text: HashMap<String, Arc<PatternShared>>,
}

impl Registry {
    fn insert(&mut self, shared: Arc<PatternShared>) {
        self.by_text.insert(shared.text.clone(), Arc::clone(&shared));
        self.order.push(shared);
    }
}

/// Handle on one open match cache store.
///
/// The registry mutex is the root-scoped lock: it is held while a new
/// pattern is created so two threads cannot both insert the same text.
pub struct MatchCache {
    store: DurableStore<Node>,
    registry: Mutex<Registry>,
}

impl MatchCache {
    /// Create a new cache store at `path`. Fails if the file exists.
    pub fn create(path: &Path, config: StoreConfig) -> CacheResult<Self> {
        Self::init(DurableStore::create(path, LAYOUT, config)?)
    }

    /// Open an existing cache store.
    pub fn open(path: &Path, config: StoreConfig) -> CacheResult<Self> {
        Self::init(DurableStore::open(path, LAYOUT, config)?)
    }

    /// Open the cache store at `path`, creating it if it does not exist.
    pub fn open_or_create(path: &Path, config: StoreConfig) -> CacheResult<Self> {
        Self::init(DurableStore::open_or_create(path, LAYOUT, config)?)
    }

    fn init(store: DurableStore<Node>) -> CacheResult<Self> {
        if !store.contains(ObjectId::ROOT) {
            let mut tx = store.begin();
            tx.put(ObjectId::ROOT, Node::Root(RootNode::default()));
            tx.commit()?;
            debug!(path = %store.path().display(), "initialized cache root");
        }

        let registry = load_registry(&store)?;
        info!(
            path = %store.path().display(),
            patterns = registry.order.len(),
            "match cache ready"
        );

        Ok(Self {
            store,
            registry: Mutex::new(registry),
        })
    }

    /// Pattern texts, most recently created first.
    pub fn patterns(&self) -> Vec<String> {
        let registry = self.registry.lock().expect("pattern registry poisoned");
        registry
            .order
            .iter()
            .rev()
            .map(|shared| shared.text.clone())
            .collect()
    }

    /// Number of known patterns.
    pub fn pattern_count(&self) -> usize {
        self.registry
            .lock()
            .expect("pattern registry poisoned")
            .order
            .len()
    }

    /// Look up an existing pattern.
    pub fn find_pattern(&self, text: &str) -> Option<PatternHandle<'_>> {
        let registry = self.registry.lock().expect("pattern registry poisoned");
        registry
            .by_text
            .get(text)
            .map(|shared| PatternHandle::new(self, Arc::clone(shared)))
    }

    /// Look up a pattern, creating it on first use.
    pub fn find_or_create_pattern(&self, text: &str) -> CacheResult<PatternHandle<'_>> {
        let mut registry = self.registry.lock().expect("pattern registry poisoned");
        if let Some(shared) = registry.by_text.get(text) {
            return Ok(PatternHandle::new(self, Arc::clone(shared)));
        }

        let mut root = match self.store.get(ObjectId::ROOT) {
            Some(Node::Root(root)) => root,
            Some(other) => {
                return Err(CacheError::UnexpectedNode {
                    id: ObjectId::ROOT,
                    expected: "root",
                    found: other.kind(),
                })
            }
            None => return Err(CacheError::NoRoot),
        };

        let mut tx = self.store.begin();
        let id = tx.alloc(Node::Pattern(PatternNode {
            text: text.to_string(),
        }));
        root.patterns.push(id);
        tx.put(ObjectId::ROOT, Node::Root(root));
        tx.commit()?;

        let shared = Arc::new(PatternShared {
            id,
            text: text.to_string(),
            files: Mutex::new(FileIndex::default()),
        });
        registry.insert(Arc::clone(&shared));
        info!(pattern = text, %id, "created pattern");

        Ok(PatternHandle::new(self, shared))
    }

    /// Store counters (commit sequence, object count, file size).
    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    /// Rewrite the store file as a compact snapshot.
    pub fn compact(&self) -> CacheResult<()> {
        Ok(self.store.compact()?)
    }

    /// Path of the backing store file.
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    pub(crate) fn store(&self) -> &DurableStore<Node> {
        &self.store
    }
}

impl std::fmt::Debug for MatchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchCache")
            .field("path", &self.store.path())
            .field("patterns", &self.pattern_count())
            .finish()
    }
}

/// Rebuild the in-memory registry from the persisted graph.
fn load_registry(store: &DurableStore<Node>) -> CacheResult<Registry> {
    let root = store
        .view(ObjectId::ROOT, |node| node.as_root(ObjectId::ROOT).cloned())
        .ok_or(CacheError::NoRoot)??;

    let mut files: HashMap<ObjectId, Vec<(ObjectId, String)>> = HashMap::new();
    store.for_each(|id, node| {
        if let Node::File(file) = node {
            files
                .entry(file.pattern)
                .or_default()
                .push((id, file.path.clone()));
        }
    });

    let mut registry = Registry::default();
    for id in root.patterns {
        let text = store
            .view(id, |node| node.as_pattern(id).map(|p| p.text.clone()))
            .ok_or(CacheError::MissingObject(id))??;

        let mut index = FileIndex::default();
        let mut owned = files.remove(&id).unwrap_or_default();
        owned.sort_by_key(|(file_id, _)| *file_id);
        for (file_id, path) in owned {
            index.insert(path, file_id);
        }

        registry.insert(Arc::new(PatternShared {
            id,
            text,
            files: Mutex::new(index),
        }));
    }

    for (pattern, orphans) in &files {
        warn!(%pattern, count = orphans.len(), "file records reference an unknown pattern");
    }

    Ok(registry)
}
