use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use mgrep_types::ObjectId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::{StoreConfig, SyncMode};
use crate::error::{StoreError, StoreResult};
use crate::format::{
    decode_record, encode_frame, encode_header, encode_record, read_frame, read_header,
    CommitRecord, FrameRead, Record, RecordRef, SnapshotView, FRAME_HEADER_SIZE,
};
use crate::transaction::{Op, Transaction};

/// Point-in-time counters for a store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreStats {
    /// Sequence number of the last committed transaction (0 if none).
    pub seq: u64,
    /// Number of live objects.
    pub objects: usize,
    /// Size of the backing file in bytes.
    pub log_bytes: u64,
    /// Next id the allocator will hand out.
    pub next_id: u64,
}

struct State<T> {
    objects: HashMap<ObjectId, T>,
    seq: u64,
}

impl<T> State<T> {
    fn empty() -> Self {
        Self {
            objects: HashMap::new(),
            seq: 0,
        }
    }

    fn apply(&mut self, ops: Vec<Op<T>>) {
        for op in ops {
            match op {
                Op::Put(id, value) => {
                    self.objects.insert(id, value);
                }
                Op::Delete(id) => {
                    self.objects.remove(&id);
                }
            }
        }
    }
}

/// Append handle on the backing file.
struct LogFile {
    file: File,
    /// Bytes up to the end of the last complete frame.
    len: u64,
}

/// Transactional, crash-consistent object store in a single file.
///
/// Objects of type `T` live in memory behind an `RwLock`; the backing file
/// holds the header followed by one frame per committed transaction (or a
/// single snapshot frame after compaction). Commits are serialized by the
/// log mutex, which is always taken before the state lock.
///
/// A handle holds an exclusive lock on `<path>.lock` for its whole lifetime,
/// so at most one handle appends to a store file at a time. The lock lives on
/// a sidecar file because compaction replaces the store file itself.
pub struct DurableStore<T> {
    path: PathBuf,
    layout: String,
    config: StoreConfig,
    state: RwLock<State<T>>,
    log: Mutex<LogFile>,
    next_id: AtomicU64,
    _lock: fd_lock::RwLock<File>,
}

impl<T> DurableStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// Initialize a new, empty store file.
    ///
    /// The header is written to a temporary file and moved into place, so a
    /// crash never leaves a half-initialized store behind.
    pub fn create(path: &Path, layout: &str, config: StoreConfig) -> StoreResult<Self> {
        let dir = parent_dir(path);
        fs::create_dir_all(dir)?;

        let header = encode_header(layout)?;
        let lock = acquire_lock(path)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&header)?;
        tmp.as_file().sync_all()?;
        tmp.persist_noclobber(path).map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                StoreError::AlreadyExists(path.to_path_buf())
            } else {
                StoreError::Io(e.error)
            }
        })?;
        sync_dir(dir)?;

        let file = OpenOptions::new().append(true).open(path)?;
        info!(path = %path.display(), layout, "created store");

        Ok(Self::assemble(
            path,
            layout,
            config,
            State::empty(),
            LogFile {
                file,
                len: header.len() as u64,
            },
            1,
            lock,
        ))
    }

    /// Open an existing store file and replay its records.
    ///
    /// Recovery stops at the first frame that is truncated, fails its CRC,
    /// or does not decode. Frames are transactions applied in order, so
    /// nothing after a torn frame can be trusted; the tail is cut off so new
    /// commits start on a clean boundary.
    pub fn open(path: &Path, layout: &str, config: StoreConfig) -> StoreResult<Self> {
        let file = OpenOptions::new().read(true).append(true).open(path)?;
        let lock = acquire_lock(path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(&file);

        let header_len = read_header(&mut reader, path, layout)?;
        let mut state = State::empty();
        let mut next_id = 1u64;
        let mut offset = header_len;
        let mut replayed = 0usize;

        loop {
            match read_frame(&mut reader, offset, file_len)? {
                FrameRead::End => break,
                FrameRead::Torn(reason) => {
                    warn!(offset, file_len, reason, "torn frame; discarding store tail");
                    break;
                }
                FrameRead::Frame(payload) => {
                    match decode_record::<T>(&payload) {
                        Ok(Record::Snapshot(snapshot)) => {
                            state.objects = snapshot.objects.into_iter().collect();
                            state.seq = snapshot.seq;
                            next_id = next_id.max(snapshot.next_id);
                        }
                        Ok(Record::Commit(commit)) => {
                            state.apply(commit.ops);
                            state.seq = commit.seq;
                            next_id = next_id.max(commit.next_id);
                        }
                        Err(e) => {
                            warn!(offset, error = %e, "undecodable frame; discarding store tail");
                            break;
                        }
                    }
                    offset += FRAME_HEADER_SIZE + payload.len() as u64;
                    replayed += 1;
                }
            }
        }
        drop(reader);

        if offset < file_len {
            file.set_len(offset)?;
            file.sync_all()?;
        }

        if let Some(max) = state.objects.keys().max() {
            next_id = next_id.max(max.get() + 1);
        }

        info!(
            path = %path.display(),
            frames = replayed,
            objects = state.objects.len(),
            seq = state.seq,
            "opened store"
        );

        Ok(Self::assemble(
            path,
            layout,
            config,
            state,
            LogFile { file, len: offset },
            next_id,
            lock,
        ))
    }

    /// Open the store at `path`, creating it first if it does not exist.
    pub fn open_or_create(path: &Path, layout: &str, config: StoreConfig) -> StoreResult<Self> {
        if path.exists() {
            return Self::open(path, layout, config);
        }
        match Self::create(path, layout, config.clone()) {
            Err(StoreError::AlreadyExists(_)) => Self::open(path, layout, config),
            other => other,
        }
    }

    fn assemble(
        path: &Path,
        layout: &str,
        config: StoreConfig,
        state: State<T>,
        log: LogFile,
        next_id: u64,
        lock: fd_lock::RwLock<File>,
    ) -> Self {
        Self {
            path: path.to_path_buf(),
            layout: layout.to_string(),
            config,
            state: RwLock::new(state),
            log: Mutex::new(log),
            next_id: AtomicU64::new(next_id),
            _lock: lock,
        }
    }

    /// Start a new transaction.
    pub fn begin(&self) -> Transaction<'_, T> {
        Transaction::new(self)
    }

    /// Clone the object stored under `id`.
    pub fn get(&self, id: ObjectId) -> Option<T> {
        self.state
            .read()
            .expect("store state lock poisoned")
            .objects
            .get(&id)
            .cloned()
    }

    /// Borrow the object stored under `id` without cloning it.
    pub fn view<R>(&self, id: ObjectId, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.state
            .read()
            .expect("store state lock poisoned")
            .objects
            .get(&id)
            .map(f)
    }

    /// Returns `true` if an object is stored under `id`.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.state
            .read()
            .expect("store state lock poisoned")
            .objects
            .contains_key(&id)
    }

    /// Visit every live object, in no particular order, under one read lock.
    pub fn for_each(&self, mut f: impl FnMut(ObjectId, &T)) {
        let state = self.state.read().expect("store state lock poisoned");
        for (id, value) in &state.objects {
            f(*id, value);
        }
    }

    /// Current counters.
    pub fn stats(&self) -> StoreStats {
        let log = self.log.lock().expect("store log mutex poisoned");
        let state = self.state.read().expect("store state lock poisoned");
        StoreStats {
            seq: state.seq,
            objects: state.objects.len(),
            log_bytes: log.len,
            next_id: self.next_id.load(Ordering::SeqCst),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The configuration this store was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Rewrite the backing file as a single snapshot of the live objects.
    pub fn compact(&self) -> StoreResult<()> {
        let mut log = self.log.lock().expect("store log mutex poisoned");
        self.compact_locked(&mut log)
    }

    pub(crate) fn allocate_id(&self) -> ObjectId {
        ObjectId::new(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    pub(crate) fn commit_ops(&self, ops: Vec<Op<T>>) -> StoreResult<u64> {
        let mut log = self.log.lock().expect("store log mutex poisoned");
        let current = self.state.read().expect("store state lock poisoned").seq;
        if ops.is_empty() {
            return Ok(current);
        }

        let record = CommitRecord {
            seq: current + 1,
            next_id: self.next_id.load(Ordering::SeqCst),
            ops,
        };
        let payload = encode_record(&RecordRef::Commit(&record))?;
        let frame = encode_frame(&payload)?;

        let capacity = self.config.capacity_bytes;
        if log.len + frame.len() as u64 > capacity {
            self.compact_locked(&mut log)?;
            let needed = log.len + frame.len() as u64;
            if needed > capacity {
                warn!(needed, capacity, "commit rejected: store full");
                return Err(StoreError::CapacityExceeded { needed, capacity });
            }
        }

        self.append_locked(&mut log, &frame)?;

        let CommitRecord { seq, ops, .. } = record;
        let op_count = ops.len();
        {
            let mut state = self.state.write().expect("store state lock poisoned");
            state.apply(ops);
            state.seq = seq;
        }

        debug!(seq, ops = op_count, bytes = frame.len(), "commit");
        Ok(seq)
    }

    fn append_locked(&self, log: &mut LogFile, frame: &[u8]) -> StoreResult<()> {
        let written = log.file.write_all(frame).and_then(|()| match self.config.sync_mode {
            SyncMode::EveryCommit => log.file.sync_data(),
            SyncMode::OsDefault => log.file.flush(),
        });

        if let Err(e) = written {
            // Cut back to the last complete frame; recovery would discard the
            // partial one anyway, but later appends must not follow it.
            if let Err(trunc) = log.file.set_len(log.len) {
                warn!(error = %trunc, "failed to truncate partial frame");
            }
            return Err(e.into());
        }

        log.len += frame.len() as u64;
        Ok(())
    }

    fn compact_locked(&self, log: &mut LogFile) -> StoreResult<()> {
        let payload = {
            let state = self.state.read().expect("store state lock poisoned");
            let mut objects: Vec<(ObjectId, &T)> =
                state.objects.iter().map(|(id, value)| (*id, value)).collect();
            objects.sort_by_key(|(id, _)| *id);
            encode_record(&RecordRef::Snapshot(SnapshotView {
                seq: state.seq,
                next_id: self.next_id.load(Ordering::SeqCst),
                objects,
            }))?
        };

        let header = encode_header(&self.layout)?;
        let frame = encode_frame(&payload)?;
        let dir = parent_dir(&self.path);

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&header)?;
        tmp.write_all(&frame)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        sync_dir(dir)?;

        let before = log.len;
        log.file = OpenOptions::new().append(true).open(&self.path)?;
        log.len = (header.len() + frame.len()) as u64;

        info!(before, after = log.len, "store compacted");
        Ok(())
    }
}

impl<T> std::fmt::Debug for DurableStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableStore")
            .field("path", &self.path)
            .field("layout", &self.layout)
            .field("next_id", &self.next_id.load(Ordering::SeqCst))
            .finish()
    }
}

/// Sidecar lock file next to the store: `grep.store` locks `grep.store.lock`.
fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

/// Take the exclusive lock for `path`, failing at once if it is held.
///
/// The guard is forgotten on purpose: the lock belongs to the open file and
/// is released when the store handle closes it.
fn acquire_lock(path: &Path) -> StoreResult<fd_lock::RwLock<File>> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path(path))?;
    let mut lock = fd_lock::RwLock::new(file);
    match lock.try_write() {
        Ok(guard) => std::mem::forget(guard),
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
            return Err(StoreError::Locked(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    }
    Ok(lock)
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const LAYOUT: &str = "test";

    fn store_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("cache.store")
    }

    fn create(dir: &tempfile::TempDir) -> DurableStore<String> {
        DurableStore::create(&store_path(dir), LAYOUT, StoreConfig::default()).unwrap()
    }

    fn reopen(dir: &tempfile::TempDir) -> DurableStore<String> {
        DurableStore::open(&store_path(dir), LAYOUT, StoreConfig::default()).unwrap()
    }

    fn put_one(store: &DurableStore<String>, value: &str) -> ObjectId {
        let mut tx = store.begin();
        let id = tx.alloc(value.to_string());
        tx.commit().unwrap();
        id
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    #[test]
    fn create_then_reopen_restores_objects() {
        let dir = tempfile::tempdir().unwrap();
        let store = create(&dir);
        let a = put_one(&store, "alpha");
        let b = put_one(&store, "beta");
        let mut tx = store.begin();
        tx.put(ObjectId::ROOT, "root".to_string());
        tx.delete(a);
        tx.commit().unwrap();
        drop(store);

        let store = reopen(&dir);
        assert!(store.get(a).is_none());
        assert_eq!(store.get(b).as_deref(), Some("beta"));
        assert_eq!(store.get(ObjectId::ROOT).as_deref(), Some("root"));
        assert_eq!(store.stats().seq, 3);
    }

    #[test]
    fn second_handle_is_refused_while_first_is_open() {
        let dir = tempfile::tempdir().unwrap();
        let store = create(&dir);
        put_one(&store, "alpha");

        let err = DurableStore::<String>::open(&store_path(&dir), LAYOUT, StoreConfig::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::Locked(_)));
        let err = DurableStore::<String>::open_or_create(&store_path(&dir), LAYOUT, StoreConfig::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::Locked(_)));

        // Compaction swaps the store file; the sidecar lock still holds.
        store.compact().unwrap();
        let err = DurableStore::<String>::open(&store_path(&dir), LAYOUT, StoreConfig::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::Locked(_)));

        drop(store);
        let store = reopen(&dir);
        assert_eq!(store.stats().objects, 1);
        assert!(dir.path().join("cache.store.lock").exists());
    }

    #[test]
    fn create_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        drop(create(&dir));
        let err = DurableStore::<String>::create(&store_path(&dir), LAYOUT, StoreConfig::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[test]
    fn open_rejects_other_layout() {
        let dir = tempfile::tempdir().unwrap();
        drop(create(&dir));
        let err = DurableStore::<String>::open(&store_path(&dir), "other", StoreConfig::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::LayoutMismatch { .. }));
    }

    #[test]
    fn open_rejects_foreign_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(store_path(&dir), b"just some text file").unwrap();
        let err = DurableStore::<String>::open(&store_path(&dir), LAYOUT, StoreConfig::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotAStore(_)));
    }

    #[test]
    fn open_or_create_handles_both_cases() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        let store = DurableStore::<String>::open_or_create(&path, LAYOUT, StoreConfig::default()).unwrap();
        let id = put_one(&store, "kept");
        drop(store);

        let store = DurableStore::<String>::open_or_create(&path, LAYOUT, StoreConfig::default()).unwrap();
        assert_eq!(store.get(id).as_deref(), Some("kept"));
    }

    #[test]
    fn ids_are_not_reused_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = create(&dir);
        let first = put_one(&store, "one");
        drop(store);

        let store = reopen(&dir);
        let second = put_one(&store, "two");
        assert!(second > first);
        assert_eq!(store.get(first).as_deref(), Some("one"));
    }

    // -----------------------------------------------------------------------
    // Crash consistency
    // -----------------------------------------------------------------------

    #[test]
    fn uncommitted_transaction_is_invisible_after_crash() {
        let dir = tempfile::tempdir().unwrap();
        let store = create(&dir);
        let id = put_one(&store, "old");

        let mut tx = store.begin();
        tx.put(id, "new".to_string());
        tx.alloc("orphan".to_string());
        // Simulated crash: the process dies with the transaction still open.
        std::mem::forget(tx);
        drop(store);

        let store = reopen(&dir);
        assert_eq!(store.get(id).as_deref(), Some("old"));
        assert_eq!(store.stats().objects, 1);
    }

    #[test]
    fn torn_tail_is_discarded_and_store_stays_writable() {
        let dir = tempfile::tempdir().unwrap();
        let store = create(&dir);
        let a = put_one(&store, "a");
        let b = put_one(&store, "b");
        let full_len = store.stats().log_bytes;
        drop(store);

        // Cut the last frame in half, as a power loss mid-write would.
        let file = OpenOptions::new().write(true).open(store_path(&dir)).unwrap();
        file.set_len(full_len - 3).unwrap();
        drop(file);

        let store = reopen(&dir);
        assert_eq!(store.get(a).as_deref(), Some("a"));
        assert!(store.get(b).is_none());
        assert_eq!(store.stats().seq, 1);

        let c = put_one(&store, "c");
        drop(store);

        let store = reopen(&dir);
        assert_eq!(store.get(c).as_deref(), Some("c"));
        assert_eq!(store.stats().seq, 2);
    }

    #[test]
    fn corrupt_frame_ends_recovery() {
        let dir = tempfile::tempdir().unwrap();
        let store = create(&dir);
        let a = put_one(&store, "a");
        let after_first = store.stats().log_bytes;
        let b = put_one(&store, "b");
        drop(store);

        // Flip the last byte of the second frame's payload.
        let mut bytes = fs::read(store_path(&dir)).unwrap();
        assert!(bytes.len() as u64 > after_first);
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(store_path(&dir), &bytes).unwrap();

        let store = reopen(&dir);
        assert_eq!(store.get(a).as_deref(), Some("a"));
        assert!(store.get(b).is_none());
        assert_eq!(store.stats().log_bytes, after_first);
    }

    #[test]
    fn garbage_appended_after_commits_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = create(&dir);
        let a = put_one(&store, "a");
        drop(store);

        let mut file = OpenOptions::new().append(true).open(store_path(&dir)).unwrap();
        file.write_all(&[0xde, 0xad, 0xbe, 0xef, 0x01]).unwrap();
        drop(file);

        let store = reopen(&dir);
        assert_eq!(store.get(a).as_deref(), Some("a"));
    }

    // -----------------------------------------------------------------------
    // Compaction and capacity
    // -----------------------------------------------------------------------

    #[test]
    fn compaction_preserves_state_and_shrinks_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = create(&dir);
        let id = put_one(&store, "v0");
        for i in 1..50 {
            let mut tx = store.begin();
            tx.put(id, format!("v{i}"));
            tx.commit().unwrap();
        }
        let before = store.stats();
        store.compact().unwrap();
        let after = store.stats();
        assert!(after.log_bytes < before.log_bytes);
        assert_eq!(after.seq, before.seq);

        put_one(&store, "post-compaction");
        drop(store);

        let store = reopen(&dir);
        assert_eq!(store.get(id).as_deref(), Some("v49"));
        assert_eq!(store.stats().objects, 2);
        assert_eq!(store.stats().seq, before.seq + 1);
    }

    #[test]
    fn capacity_exhaustion_rejects_commit_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::default().with_capacity(256);
        let store = DurableStore::<String>::create(&store_path(&dir), LAYOUT, config.clone()).unwrap();
        let small = put_one(&store, "small");
        let before = store.stats();

        let mut tx = store.begin();
        let big = tx.alloc("x".repeat(1024));
        let err = tx.commit().unwrap_err();
        assert!(matches!(err, StoreError::CapacityExceeded { capacity: 256, .. }));
        assert!(store.get(big).is_none());
        assert_eq!(store.stats().seq, before.seq);
        drop(store);

        let store = DurableStore::<String>::open(&store_path(&dir), LAYOUT, config).unwrap();
        assert_eq!(store.get(small).as_deref(), Some("small"));
        assert!(store.get(big).is_none());
    }

    #[test]
    fn full_log_is_compacted_before_failing() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::default().with_capacity(512);
        let store = DurableStore::<String>::create(&store_path(&dir), LAYOUT, config).unwrap();
        let id = put_one(&store, "v");
        // Each overwrite appends a frame; without compaction this overflows.
        for i in 0..100 {
            let mut tx = store.begin();
            tx.put(id, format!("v{i}"));
            tx.commit().unwrap();
        }
        assert_eq!(store.get(id).as_deref(), Some("v99"));
        assert!(store.stats().log_bytes <= 512);
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_commits_are_all_durable() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(create(&dir));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    (0..25)
                        .map(|i| put_one(&store, &format!("{t}-{i}")))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let ids: Vec<ObjectId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        drop(store);

        let store = reopen(&dir);
        assert_eq!(store.stats().seq, 100);
        assert_eq!(store.stats().objects, 100);
        for id in ids {
            assert!(store.contains(id));
        }
    }

    #[test]
    fn view_borrows_without_clone() {
        let dir = tempfile::tempdir().unwrap();
        let store = create(&dir);
        let id = put_one(&store, "hello");
        assert_eq!(store.view(id, |s| s.len()), Some(5));
        assert_eq!(store.view(ObjectId::new(999), |s| s.len()), None);
    }

    #[test]
    fn for_each_visits_every_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = create(&dir);
        put_one(&store, "a");
        put_one(&store, "bb");
        put_one(&store, "ccc");

        let mut total = 0;
        let mut seen = 0;
        store.for_each(|_, value| {
            total += value.len();
            seen += 1;
        });
        assert_eq!(seen, 3);
        assert_eq!(total, 6);
    }
}
