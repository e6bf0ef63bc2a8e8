//! Core storage contract traits.
//!
//! This module defines the capability set every storage backend must
//! implement:
//!
//! - [`Write`] - Single-key put/delete, no cross-call atomicity
//! - [`Storage`] - The aggregate surface: reads, iteration, batching, close
//! - [`Cursor`] - Bidirectional, seekable iteration in key order
//! - [`Batch`] - Staged mutations applied as one atomic unit
//!
//! Backends implement these independently; callers written against the
//! traits can swap engines without behavior change.

use std::sync::Arc;

use super::{prefix_upper_bound, StorageResult};

/// An owned key-value pair.
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// The write half of the storage surface.
///
/// Writes on the handle take effect individually and are immediately
/// visible to subsequent reads on the same handle. For atomicity across
/// several mutations, use [`Storage::batch`].
pub trait Write {
    /// Store `value` under `key`, inserting or overwriting.
    ///
    /// Keys and values are opaque byte sequences; a zero-length value is
    /// valid and distinct from an absent key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Closed`] after the handle was closed, or a
    /// fault variant on engine failure. Never fails merely because the key
    /// already exists.
    ///
    /// [`StorageError::Closed`]: super::StorageError::Closed
    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Remove `key` from the store.
    ///
    /// Deleting an absent key is a no-op and returns `Ok(())` — deletion
    /// is idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Closed`] after the handle was closed, or a
    /// fault variant on engine failure.
    ///
    /// [`StorageError::Closed`]: super::StorageError::Closed
    fn delete(&self, key: &[u8]) -> StorageResult<()>;
}

/// A key-value store ordered by lexicographic byte comparison of keys.
///
/// The state of a `Storage` instance is a finite mapping from keys to
/// values; every read, iteration, and prefix operation respects the key
/// order. Implementations must be thread-safe (`Send + Sync`) — handles
/// may be shared across threads.
///
/// # Example
///
/// ```
/// use ordkv::backends::MemoryStorage;
/// use ordkv::{Batch, Cursor, Storage, Write};
///
/// # fn main() -> ordkv::StorageResult<()> {
/// let store = MemoryStorage::new();
/// store.put(b"user:1", b"Alice")?;
/// store.put(b"user:2", b"Bob")?;
///
/// let mut batch = store.batch()?;
/// batch.put(b"user:3", b"Carol");
/// batch.delete(b"user:1");
/// batch.commit()?;
///
/// let mut cursor = store.prefix(b"user:")?;
/// while cursor.next()? {
///     let key = cursor.key().expect("positioned");
///     assert!(key.starts_with(b"user:"));
/// }
/// store.close()?;
/// # Ok(())
/// # }
/// ```
pub trait Storage: Write + Send + Sync {
    /// The cursor type for iteration.
    type Cursor<'a>: Cursor
    where
        Self: 'a;

    /// The batch type for atomic multi-key writes.
    type Batch<'a>: Batch
    where
        Self: 'a;

    /// Get the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the key is absent. This is the
    /// expected miss outcome, not a fault — callers branch on it via
    /// [`StorageError::is_not_found`].
    ///
    /// [`StorageError::NotFound`]: super::StorageError::NotFound
    /// [`StorageError::is_not_found`]: super::StorageError::is_not_found
    fn get(&self, key: &[u8]) -> StorageResult<Vec<u8>>;

    /// Whether `key` is present, without fetching the value.
    ///
    /// Agrees exactly with [`Storage::get`]: `has` returns `true` iff `get`
    /// would succeed, with no staleness relative to the latest completed
    /// write on this handle.
    fn has(&self, key: &[u8]) -> StorageResult<bool>;

    /// Open a cursor over the keys in the half-open range `[start, end)`.
    ///
    /// `None` (or an empty slice) on either side means unbounded;
    /// `(None, None)` iterates the entire store. An empty resulting range
    /// is not an error — the cursor is simply exhausted immediately.
    ///
    /// The cursor starts unpositioned; advance it with [`Cursor::next`],
    /// [`Cursor::prev`], or [`Cursor::seek`].
    fn iter(&self, start: Option<&[u8]>, end: Option<&[u8]>) -> StorageResult<Self::Cursor<'_>>;

    /// Open a cursor over exactly the keys that have `prefix` as a byte
    /// prefix, in key order.
    ///
    /// Equivalent to `iter` bounded below by the prefix and above by the
    /// prefix incremented at its last byte with carry; when every byte is
    /// `0xFF` (or the prefix is empty) there is no upper bound.
    fn prefix(&self, prefix: &[u8]) -> StorageResult<Self::Cursor<'_>> {
        let upper = prefix_upper_bound(prefix);
        self.iter(Some(prefix), upper.as_deref())
    }

    /// Create a fresh batch with an empty pending-operation log.
    ///
    /// # Errors
    ///
    /// Never fails on an open handle; returns [`StorageError::Closed`]
    /// after the handle was closed.
    ///
    /// [`StorageError::Closed`]: super::StorageError::Closed
    fn batch(&self) -> StorageResult<Self::Batch<'_>>;

    /// Release the resources held by this handle.
    ///
    /// After a successful close, every further operation on the handle,
    /// its outstanding cursors, and its uncommitted batches fails with
    /// [`StorageError::Closed`]. Close is idempotent: repeated calls
    /// return `Ok(())`.
    ///
    /// [`StorageError::Closed`]: super::StorageError::Closed
    fn close(&self) -> StorageResult<()>;
}

/// A bidirectional, seekable cursor over a key range.
///
/// A cursor starts unpositioned. `next` from that state moves to the first
/// key in range and `prev` to the last; from a position, each call steps
/// one key in the requested direction from the *current key*, so mixing
/// directions is well-defined. When a step finds no key the cursor becomes
/// exhausted in that direction and the call returns `Ok(false)`; `seek`
/// re-enables iteration from any state.
///
/// Exhaustion is reported through the boolean, never through the error
/// channel — errors carry only closed-handle and engine faults.
///
/// Cursors never mutate the store, and dropping one at any point is safe.
///
/// # Iteration Pattern
///
/// ```ignore
/// let mut cursor = store.iter(None, None)?;
/// while cursor.next()? {
///     let (key, value) = (cursor.key().unwrap(), cursor.value().unwrap());
///     // process the pair
/// }
/// ```
pub trait Cursor {
    /// Move one key forward in ascending order.
    ///
    /// From the unpositioned state (or after backward exhaustion) this
    /// positions on the first key in range. Returns `Ok(false)` and
    /// becomes forward-exhausted when no further key exists.
    fn next(&mut self) -> StorageResult<bool>;

    /// Move one key backward in descending order.
    ///
    /// From the unpositioned state (or after forward exhaustion) this
    /// positions on the last key in range. Returns `Ok(false)` and
    /// becomes backward-exhausted when no earlier key exists.
    fn prev(&mut self) -> StorageResult<bool>;

    /// Reposition to the first key greater than or equal to `key` within
    /// the range, independent of prior direction or exhaustion.
    ///
    /// Targets below the range start clamp to the start. Returns whether
    /// such a key exists.
    fn seek(&mut self, key: &[u8]) -> StorageResult<bool>;

    /// The key of the current pair, or `None` when the cursor is
    /// unpositioned or exhausted. Never panics.
    fn key(&self) -> Option<&[u8]>;

    /// The value of the current pair, or `None` when the cursor is
    /// unpositioned or exhausted. Never panics.
    fn value(&self) -> Option<&[u8]>;
}

/// A staged set of mutations committed as one atomic unit.
///
/// `put` and `delete` append to a pending log without touching the store;
/// nothing staged is visible to any reader until [`Batch::commit`]. The
/// log applies in call order with last-write-wins per key, so a `delete`
/// staged after a `put` of the same key wins, and vice versa.
///
/// `commit` consumes the batch, so a batch can be committed at most once
/// by construction. Dropping a batch without committing discards the log
/// with no effect on the store.
pub trait Batch {
    /// Stage a put. Infallible: the operation is only recorded.
    fn put(&mut self, key: &[u8], value: &[u8]);

    /// Stage a delete. Infallible: the operation is only recorded.
    fn delete(&mut self, key: &[u8]);

    /// Apply the pending log to the store as a single atomic unit.
    ///
    /// Either every staged operation becomes visible together, or none
    /// does: no reader can observe a partially-applied batch.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Closed`] if the handle was closed, or a
    /// fault variant on engine failure — in which case the store is left
    /// exactly as it was before the call.
    ///
    /// [`StorageError::Closed`]: super::StorageError::Closed
    fn commit(self) -> StorageResult<()>;
}

// ============================================================================
// Blanket Implementations
// ============================================================================

/// Implement `Write` for `Arc<S>` to allow shared ownership of handles.
impl<S: Write> Write for Arc<S> {
    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &[u8]) -> StorageResult<()> {
        (**self).delete(key)
    }
}

/// Implement `Storage` for `Arc<S>` to allow shared ownership of handles.
///
/// This is useful when multiple components hold the same store, such as
/// readers and a writer living on different tasks.
impl<S: Storage> Storage for Arc<S> {
    type Cursor<'a>
        = S::Cursor<'a>
    where
        Self: 'a;

    type Batch<'a>
        = S::Batch<'a>
    where
        Self: 'a;

    fn get(&self, key: &[u8]) -> StorageResult<Vec<u8>> {
        (**self).get(key)
    }

    fn has(&self, key: &[u8]) -> StorageResult<bool> {
        (**self).has(key)
    }

    fn iter(&self, start: Option<&[u8]>, end: Option<&[u8]>) -> StorageResult<Self::Cursor<'_>> {
        (**self).iter(start, end)
    }

    fn prefix(&self, prefix: &[u8]) -> StorageResult<Self::Cursor<'_>> {
        (**self).prefix(prefix)
    }

    fn batch(&self) -> StorageResult<Self::Batch<'_>> {
        (**self).batch()
    }

    fn close(&self) -> StorageResult<()> {
        (**self).close()
    }
}
