//! Redb-backed storage handle and batch.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use redb::{Database, ReadableTable};
use tracing::{debug, trace};

use crate::backends::BatchOp;
use crate::engine::{Batch, KeyRange, Storage, StorageError, StorageResult, Write};

use super::cursor::RedbCursor;
use super::DATA_TABLE;

/// Configuration options for the Redb storage engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedbConfig {
    /// Cache size in bytes. If not set, uses Redb's default.
    pub cache_size: Option<usize>,
}

impl RedbConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache size.
    #[must_use]
    pub const fn cache_size(mut self, size: usize) -> Self {
        self.cache_size = Some(size);
        self
    }
}

pub(super) struct Shared {
    db: RwLock<Option<Database>>,
    closed: AtomicBool,
}

impl Shared {
    pub(super) fn ensure_open(&self) -> StorageResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(StorageError::Closed)
        } else {
            Ok(())
        }
    }

    fn with_db<T>(&self, f: impl FnOnce(&Database) -> StorageResult<T>) -> StorageResult<T> {
        let guard =
            self.db.read().map_err(|_| StorageError::Backend("database lock poisoned".to_string()))?;
        match guard.as_ref() {
            Some(db) => f(db),
            None => Err(StorageError::Closed),
        }
    }
}

/// A storage engine backed by Redb.
///
/// Handles are cheaply cloneable and share the same underlying database.
///
/// # Cursor Consistency
///
/// Cursors over this engine are **snapshots**: each cursor owns a read
/// transaction begun when the cursor was opened, so writes committed
/// afterwards are not visible to it.
///
/// # Example
///
/// ```ignore
/// use ordkv::backends::RedbStorage;
/// use ordkv::{Storage, Write};
///
/// let store = RedbStorage::open("my_database.redb")?;
/// store.put(b"user:1", b"Alice")?;
/// assert_eq!(store.get(b"user:1")?, b"Alice");
/// ```
#[derive(Clone)]
pub struct RedbStorage {
    shared: Arc<Shared>,
}

impl RedbStorage {
    /// Open or create a database at the given path with default
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be opened or
    /// created.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::open_with_config(path, RedbConfig::default())
    }

    /// Open or create a database at the given path with custom
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be opened or
    /// created.
    pub fn open_with_config(path: impl AsRef<Path>, config: RedbConfig) -> StorageResult<Self> {
        let mut builder = Database::builder();
        if let Some(cache_size) = config.cache_size {
            builder.set_cache_size(cache_size);
        }

        debug!(path = %path.as_ref().display(), "opening database");
        let db =
            builder.create(path.as_ref()).map_err(|e| StorageError::Open(e.to_string()))?;

        Ok(Self::from_db(db))
    }

    /// Create an in-memory database, primarily for testing.
    ///
    /// The data is lost when the last handle is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be created.
    pub fn in_memory() -> StorageResult<Self> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(|e| StorageError::Open(e.to_string()))?;

        Ok(Self::from_db(db))
    }

    fn from_db(db: Database) -> Self {
        Self {
            shared: Arc::new(Shared {
                db: RwLock::new(Some(db)),
                closed: AtomicBool::new(false),
            }),
        }
    }
}

impl Write for RedbStorage {
    fn put(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.shared.with_db(|db| {
            let tx = db.begin_write().map_err(|e| StorageError::Backend(e.to_string()))?;
            {
                let mut table =
                    tx.open_table(DATA_TABLE).map_err(|e| StorageError::Backend(e.to_string()))?;
                table.insert(key, value).map_err(|e| StorageError::Backend(e.to_string()))?;
            }
            tx.commit().map_err(|e| StorageError::Backend(e.to_string()))
        })
    }

    fn delete(&self, key: &[u8]) -> StorageResult<()> {
        self.shared.with_db(|db| {
            let tx = db.begin_write().map_err(|e| StorageError::Backend(e.to_string()))?;
            {
                let mut table =
                    tx.open_table(DATA_TABLE).map_err(|e| StorageError::Backend(e.to_string()))?;
                // Removing an absent key yields None, which is not an error.
                table.remove(key).map_err(|e| StorageError::Backend(e.to_string()))?;
            }
            tx.commit().map_err(|e| StorageError::Backend(e.to_string()))
        })
    }
}

impl Storage for RedbStorage {
    type Cursor<'a>
        = RedbCursor
    where
        Self: 'a;

    type Batch<'a>
        = RedbBatch
    where
        Self: 'a;

    fn get(&self, key: &[u8]) -> StorageResult<Vec<u8>> {
        self.shared.with_db(|db| {
            let tx = db.begin_read().map_err(|e| StorageError::Backend(e.to_string()))?;
            match tx.open_table(DATA_TABLE) {
                Ok(table) => match table.get(key) {
                    Ok(Some(value)) => Ok(value.value().to_vec()),
                    Ok(None) => Err(StorageError::NotFound),
                    Err(e) => Err(StorageError::Backend(e.to_string())),
                },
                // An empty database has no data table yet.
                Err(redb::TableError::TableDoesNotExist(_)) => Err(StorageError::NotFound),
                Err(e) => Err(StorageError::Backend(e.to_string())),
            }
        })
    }

    fn has(&self, key: &[u8]) -> StorageResult<bool> {
        self.shared.with_db(|db| {
            let tx = db.begin_read().map_err(|e| StorageError::Backend(e.to_string()))?;
            match tx.open_table(DATA_TABLE) {
                Ok(table) => match table.get(key) {
                    Ok(found) => Ok(found.is_some()),
                    Err(e) => Err(StorageError::Backend(e.to_string())),
                },
                Err(redb::TableError::TableDoesNotExist(_)) => Ok(false),
                Err(e) => Err(StorageError::Backend(e.to_string())),
            }
        })
    }

    fn iter(&self, start: Option<&[u8]>, end: Option<&[u8]>) -> StorageResult<Self::Cursor<'_>> {
        let tx = self.shared.with_db(|db| {
            db.begin_read().map_err(|e| StorageError::Backend(e.to_string()))
        })?;
        Ok(RedbCursor::new(Arc::clone(&self.shared), tx, KeyRange::new(start, end)))
    }

    fn batch(&self) -> StorageResult<Self::Batch<'_>> {
        self.shared.ensure_open()?;
        Ok(RedbBatch { shared: Arc::clone(&self.shared), ops: Vec::new() })
    }

    fn close(&self) -> StorageResult<()> {
        if !self.shared.closed.swap(true, Ordering::SeqCst) {
            debug!("closing database");
            if let Ok(mut guard) = self.shared.db.write() {
                *guard = None;
            }
        }
        Ok(())
    }
}

/// A staged batch of mutations against a [`RedbStorage`].
///
/// Operations accumulate in an in-memory log; `commit` replays the log
/// inside a single Redb write transaction, whose commit makes the whole
/// batch visible at once. If anything fails before the transaction commits,
/// it aborts on drop and the store is unchanged.
pub struct RedbBatch {
    pub(super) shared: Arc<Shared>,
    pub(super) ops: Vec<BatchOp>,
}

impl Batch for RedbBatch {
    fn put(&mut self, key: &[u8], value: &[u8]) {
        self.ops.push(BatchOp::Put { key: key.to_vec(), value: value.to_vec() });
    }

    fn delete(&mut self, key: &[u8]) {
        self.ops.push(BatchOp::Delete { key: key.to_vec() });
    }

    fn commit(self) -> StorageResult<()> {
        let Self { shared, ops } = self;
        shared.with_db(|db| {
            let tx = db.begin_write().map_err(|e| StorageError::Backend(e.to_string()))?;
            {
                let mut table =
                    tx.open_table(DATA_TABLE).map_err(|e| StorageError::Backend(e.to_string()))?;
                for op in &ops {
                    match op {
                        BatchOp::Put { key, value } => {
                            table
                                .insert(key.as_slice(), value.as_slice())
                                .map_err(|e| StorageError::Backend(e.to_string()))?;
                        }
                        BatchOp::Delete { key } => {
                            table
                                .remove(key.as_slice())
                                .map_err(|e| StorageError::Backend(e.to_string()))?;
                        }
                    }
                }
            }
            trace!(ops = ops.len(), "committing batch");
            tx.commit().map_err(|e| StorageError::Backend(e.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_creation() {
        let store = RedbStorage::in_memory().expect("failed to create in-memory db");
        assert!(!store.has(b"anything").expect("failed to has"));
    }

    #[test]
    fn test_config_builder() {
        let config = RedbConfig::new().cache_size(10 * 1024 * 1024);
        assert_eq!(config.cache_size, Some(10 * 1024 * 1024));
    }

    #[test]
    fn test_write_and_read() {
        let store = RedbStorage::in_memory().expect("failed to create in-memory db");

        store.put(b"key", b"value").expect("failed to put");
        assert_eq!(store.get(b"key").expect("failed to get"), b"value");

        store.delete(b"key").expect("failed to delete");
        assert!(store.get(b"key").expect_err("should miss").is_not_found());
    }

    #[test]
    fn test_clones_share_database() {
        let store = RedbStorage::in_memory().expect("failed to create in-memory db");
        let clone = store.clone();

        store.put(b"key", b"value").expect("failed to put");
        assert_eq!(clone.get(b"key").expect("failed to get"), b"value");

        clone.close().expect("failed to close");
        assert!(store.get(b"key").expect_err("should be closed").is_closed());
    }
}
