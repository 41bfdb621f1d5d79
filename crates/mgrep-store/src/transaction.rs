use mgrep_types::ObjectId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreResult;
use crate::store::DurableStore;

/// A single buffered mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op<T> {
    /// Create or overwrite an object.
    Put(ObjectId, T),
    /// Remove an object.
    Delete(ObjectId),
}

/// An all-or-nothing batch of mutations against a [`DurableStore`].
///
/// Operations are buffered in memory until [`commit`](Self::commit). Nothing
/// reaches the backing file before that, so dropping the transaction (or
/// panicking while it is open) is a rollback.
pub struct Transaction<'a, T> {
    store: &'a DurableStore<T>,
    ops: Vec<Op<T>>,
}

impl<'a, T> Transaction<'a, T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    pub(crate) fn new(store: &'a DurableStore<T>) -> Self {
        Self {
            store,
            ops: Vec::new(),
        }
    }

    /// Reserve a fresh id and stage `value` under it.
    pub fn alloc(&mut self, value: T) -> ObjectId {
        let id = self.store.allocate_id();
        self.ops.push(Op::Put(id, value));
        id
    }

    /// Stage a create-or-overwrite of `id`.
    pub fn put(&mut self, id: ObjectId, value: T) {
        self.ops.push(Op::Put(id, value));
    }

    /// Stage a removal of `id`.
    pub fn delete(&mut self, id: ObjectId) {
        self.ops.push(Op::Delete(id));
    }

    /// Number of staged operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns `true` if nothing has been staged.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Durably apply every staged operation, or none of them.
    ///
    /// Returns the commit sequence number. An empty transaction writes
    /// nothing and returns the current sequence number.
    pub fn commit(mut self) -> StoreResult<u64> {
        let ops = std::mem::take(&mut self.ops);
        self.store.commit_ops(ops)
    }

    /// Discard every staged operation.
    pub fn rollback(mut self) {
        self.ops.clear();
    }
}

impl<T> Drop for Transaction<'_, T> {
    fn drop(&mut self) {
        if !self.ops.is_empty() {
            debug!(ops = self.ops.len(), "transaction dropped without commit; rolled back");
        }
    }
}
