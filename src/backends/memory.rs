//! In-memory storage engine.
//!
//! This is the reference engine: an ordered map behind a read-write lock,
//! with no persistence. It is useful on its own for tests and ephemeral
//! state, and as the baseline other engines are conformance-tested against.
//!
//! # Cursor Consistency
//!
//! Cursors over this engine are a **live view**. A cursor holds a key
//! marker rather than a snapshot; every step re-reads the shared map under
//! a read lock and finds the adjacent key from the marker. Mutations made
//! after a cursor was opened are therefore visible to it, and a step never
//! yields a pair that is not in the map at the moment of the step.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace};

use crate::engine::{
    bounds_empty, Batch, Cursor, KeyRange, KeyValue, Storage, StorageError, StorageResult, Write,
};

use super::{BatchOp, Position};

type Map = BTreeMap<Vec<u8>, Vec<u8>>;

/// An in-memory storage engine backed by a [`BTreeMap`].
///
/// Handles are cheaply cloneable and share the same underlying map, so a
/// clone behaves like the original handle — including `close`, which
/// closes every clone.
///
/// # Example
///
/// ```
/// use ordkv::backends::MemoryStorage;
/// use ordkv::{Storage, Write};
///
/// # fn main() -> ordkv::StorageResult<()> {
/// let store = MemoryStorage::new();
/// store.put(b"key", b"value")?;
/// assert_eq!(store.get(b"key")?, b"value");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MemoryStorage {
    shared: Arc<Shared>,
}

struct Shared {
    map: RwLock<Map>,
    closed: AtomicBool,
}

impl Shared {
    fn ensure_open(&self) -> StorageResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(StorageError::Closed)
        } else {
            Ok(())
        }
    }

    fn read_map(&self) -> StorageResult<RwLockReadGuard<'_, Map>> {
        self.map.read().map_err(|_| StorageError::Backend("map lock poisoned".to_string()))
    }

    fn write_map(&self) -> StorageResult<RwLockWriteGuard<'_, Map>> {
        self.map.write().map_err(|_| StorageError::Backend("map lock poisoned".to_string()))
    }
}

impl MemoryStorage {
    /// Create a new, empty in-memory store.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                map: RwLock::new(BTreeMap::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// The number of keys currently stored.
    pub fn len(&self) -> StorageResult<usize> {
        self.shared.ensure_open()?;
        Ok(self.shared.read_map()?.len())
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for MemoryStorage {
    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.shared.ensure_open()?;
        self.shared.write_map()?.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StorageResult<()> {
        self.shared.ensure_open()?;
        self.shared.write_map()?.remove(key);
        Ok(())
    }
}

impl Storage for MemoryStorage {
    type Cursor<'a>
        = MemoryCursor
    where
        Self: 'a;

    type Batch<'a>
        = MemoryBatch
    where
        Self: 'a;

    fn get(&self, key: &[u8]) -> StorageResult<Vec<u8>> {
        self.shared.ensure_open()?;
        self.shared.read_map()?.get(key).cloned().ok_or(StorageError::NotFound)
    }

    fn has(&self, key: &[u8]) -> StorageResult<bool> {
        self.shared.ensure_open()?;
        Ok(self.shared.read_map()?.contains_key(key))
    }

    fn iter(&self, start: Option<&[u8]>, end: Option<&[u8]>) -> StorageResult<Self::Cursor<'_>> {
        self.shared.ensure_open()?;
        Ok(MemoryCursor {
            shared: Arc::clone(&self.shared),
            range: KeyRange::new(start, end),
            pos: Position::Unpositioned,
            current: None,
        })
    }

    fn batch(&self) -> StorageResult<Self::Batch<'_>> {
        self.shared.ensure_open()?;
        Ok(MemoryBatch { shared: Arc::clone(&self.shared), ops: Vec::new() })
    }

    fn close(&self) -> StorageResult<()> {
        if !self.shared.closed.swap(true, Ordering::SeqCst) {
            debug!("closing in-memory storage");
            if let Ok(mut map) = self.shared.map.write() {
                map.clear();
            }
        }
        Ok(())
    }
}

/// Find the first pair within `(lower, upper)`, cloning it out of the map.
fn scan_first(map: &Map, lower: Bound<&[u8]>, upper: Bound<&[u8]>) -> Option<KeyValue> {
    if bounds_empty(&lower, &upper) {
        return None;
    }
    map.range::<[u8], _>((lower, upper)).next().map(|(k, v)| (k.clone(), v.clone()))
}

/// Find the last pair within `(lower, upper)`, cloning it out of the map.
fn scan_last(map: &Map, lower: Bound<&[u8]>, upper: Bound<&[u8]>) -> Option<KeyValue> {
    if bounds_empty(&lower, &upper) {
        return None;
    }
    map.range::<[u8], _>((lower, upper)).next_back().map(|(k, v)| (k.clone(), v.clone()))
}

/// A live-view cursor over a [`MemoryStorage`].
///
/// Holds a key marker into the shared map; each step takes the read lock
/// and moves to the adjacent key from the marker, so a deleted current key
/// does not stall iteration and later inserts within the window are seen.
pub struct MemoryCursor {
    shared: Arc<Shared>,
    range: KeyRange,
    pos: Position,
    current: Option<KeyValue>,
}

impl MemoryCursor {
    fn settle_forward(&mut self, found: Option<KeyValue>) -> bool {
        match found {
            Some((key, value)) => {
                self.pos = Position::At(key.clone());
                self.current = Some((key, value));
                true
            }
            None => {
                self.pos = Position::PastLast;
                self.current = None;
                false
            }
        }
    }

    fn settle_backward(&mut self, found: Option<KeyValue>) -> bool {
        match found {
            Some((key, value)) => {
                self.pos = Position::At(key.clone());
                self.current = Some((key, value));
                true
            }
            None => {
                self.pos = Position::BeforeFirst;
                self.current = None;
                false
            }
        }
    }
}

impl Cursor for MemoryCursor {
    fn next(&mut self) -> StorageResult<bool> {
        self.shared.ensure_open()?;
        let found = {
            let map = self.shared.read_map()?;
            match &self.pos {
                Position::PastLast => None,
                Position::Unpositioned | Position::BeforeFirst => {
                    scan_first(&map, self.range.lower(), self.range.upper())
                }
                Position::At(key) => {
                    scan_first(&map, Bound::Excluded(key.as_slice()), self.range.upper())
                }
            }
        };
        Ok(self.settle_forward(found))
    }

    fn prev(&mut self) -> StorageResult<bool> {
        self.shared.ensure_open()?;
        let found = {
            let map = self.shared.read_map()?;
            match &self.pos {
                Position::BeforeFirst => None,
                Position::Unpositioned | Position::PastLast => {
                    scan_last(&map, self.range.lower(), self.range.upper())
                }
                Position::At(key) => {
                    scan_last(&map, self.range.lower(), Bound::Excluded(key.as_slice()))
                }
            }
        };
        Ok(self.settle_backward(found))
    }

    fn seek(&mut self, key: &[u8]) -> StorageResult<bool> {
        self.shared.ensure_open()?;
        let found = {
            let map = self.shared.read_map()?;
            let target = self.range.clamp(key);
            scan_first(&map, Bound::Included(target), self.range.upper())
        };
        Ok(self.settle_forward(found))
    }

    fn key(&self) -> Option<&[u8]> {
        self.current.as_ref().map(|(key, _)| key.as_slice())
    }

    fn value(&self) -> Option<&[u8]> {
        self.current.as_ref().map(|(_, value)| value.as_slice())
    }
}

/// A staged batch of mutations against a [`MemoryStorage`].
///
/// Operations accumulate in an in-memory log; `commit` applies the whole
/// log inside one write-lock critical section, so readers observe either
/// none or all of it.
pub struct MemoryBatch {
    shared: Arc<Shared>,
    ops: Vec<BatchOp>,
}

impl Batch for MemoryBatch {
    fn put(&mut self, key: &[u8], value: &[u8]) {
        self.ops.push(BatchOp::Put { key: key.to_vec(), value: value.to_vec() });
    }

    fn delete(&mut self, key: &[u8]) {
        self.ops.push(BatchOp::Delete { key: key.to_vec() });
    }

    fn commit(self) -> StorageResult<()> {
        let Self { shared, ops } = self;
        shared.ensure_open()?;
        let mut map = shared.write_map()?;
        trace!(ops = ops.len(), "committing batch");
        for op in ops {
            match op {
                BatchOp::Put { key, value } => {
                    map.insert(key, value);
                }
                BatchOp::Delete { key } => {
                    map.remove(&key);
                }
            }
        }
        Ok(())
    }
}
