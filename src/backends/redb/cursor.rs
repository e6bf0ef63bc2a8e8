//! Redb cursor implementation.
//!
//! The cursor owns a read transaction begun when it was opened, so it sees
//! a consistent snapshot of the store for its entire lifetime. Forward
//! iteration streams entries in prefetched chunks to amortize the cost of
//! reopening the table per step; the prefetch buffer is discarded whenever
//! the direction changes or the cursor seeks.

use std::collections::VecDeque;
use std::ops::Bound;
use std::sync::Arc;

use redb::{ReadTransaction, ReadableTable};

use crate::backends::Position;
use crate::engine::{bounds_empty, Cursor, KeyRange, KeyValue, StorageError, StorageResult};

use super::store::Shared;
use super::DATA_TABLE;

/// Maximum entries fetched ahead during forward iteration.
const PREFETCH_BATCH: usize = 256;

/// A snapshot cursor over a [`RedbStorage`].
///
/// [`RedbStorage`]: super::RedbStorage
pub struct RedbCursor {
    shared: Arc<Shared>,
    tx: ReadTransaction,
    range: KeyRange,
    pos: Position,
    current: Option<KeyValue>,
    prefetch: VecDeque<KeyValue>,
}

impl RedbCursor {
    pub(super) fn new(shared: Arc<Shared>, tx: ReadTransaction, range: KeyRange) -> Self {
        Self {
            shared,
            tx,
            range,
            pos: Position::Unpositioned,
            current: None,
            prefetch: VecDeque::new(),
        }
    }

    /// Fetch up to `limit` entries at or above `lower`, in ascending order,
    /// bounded above by the cursor's window.
    fn fetch_forward(&self, lower: Bound<&[u8]>, limit: usize) -> StorageResult<Vec<KeyValue>> {
        let upper = self.range.upper();
        if bounds_empty(&lower, &upper) {
            return Ok(Vec::new());
        }

        let table = match self.tx.open_table(DATA_TABLE) {
            Ok(table) => table,
            // An empty database has no data table yet.
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Backend(e.to_string())),
        };

        let range = table
            .range::<&[u8]>((lower, upper))
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let mut entries = Vec::new();
        for item in range {
            if entries.len() >= limit {
                break;
            }
            let (key, value) = item.map_err(|e| StorageError::Backend(e.to_string()))?;
            entries.push((key.value().to_vec(), value.value().to_vec()));
        }
        Ok(entries)
    }

    /// Fetch the last entry below `upper`, bounded below by the cursor's
    /// window.
    fn fetch_last(&self, upper: Bound<&[u8]>) -> StorageResult<Option<KeyValue>> {
        let lower = self.range.lower();
        if bounds_empty(&lower, &upper) {
            return Ok(None);
        }

        let table = match self.tx.open_table(DATA_TABLE) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(StorageError::Backend(e.to_string())),
        };

        let mut range = table
            .range::<&[u8]>((lower, upper))
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        match range.next_back() {
            Some(item) => {
                let (key, value) = item.map_err(|e| StorageError::Backend(e.to_string()))?;
                Ok(Some((key.value().to_vec(), value.value().to_vec())))
            }
            None => Ok(None),
        }
    }
}

impl Cursor for RedbCursor {
    fn next(&mut self) -> StorageResult<bool> {
        self.shared.ensure_open()?;
        if matches!(self.pos, Position::PastLast) {
            return Ok(false);
        }

        if self.prefetch.is_empty() {
            let batch = match &self.pos {
                Position::At(key) => {
                    self.fetch_forward(Bound::Excluded(key.as_slice()), PREFETCH_BATCH)?
                }
                _ => self.fetch_forward(self.range.lower(), PREFETCH_BATCH)?,
            };
            self.prefetch = batch.into();
        }

        match self.prefetch.pop_front() {
            Some((key, value)) => {
                self.pos = Position::At(key.clone());
                self.current = Some((key, value));
                Ok(true)
            }
            None => {
                self.pos = Position::PastLast;
                self.current = None;
                Ok(false)
            }
        }
    }

    fn prev(&mut self) -> StorageResult<bool> {
        self.shared.ensure_open()?;
        self.prefetch.clear();

        let found = match &self.pos {
            Position::BeforeFirst => None,
            Position::At(key) => self.fetch_last(Bound::Excluded(key.as_slice()))?,
            Position::Unpositioned | Position::PastLast => self.fetch_last(self.range.upper())?,
        };

        match found {
            Some((key, value)) => {
                self.pos = Position::At(key.clone());
                self.current = Some((key, value));
                Ok(true)
            }
            None => {
                self.pos = Position::BeforeFirst;
                self.current = None;
                Ok(false)
            }
        }
    }

    fn seek(&mut self, key: &[u8]) -> StorageResult<bool> {
        self.shared.ensure_open()?;
        self.prefetch.clear();

        let batch = {
            let target = self.range.clamp(key);
            self.fetch_forward(Bound::Included(target), PREFETCH_BATCH)?
        };
        let mut entries: VecDeque<KeyValue> = batch.into();

        match entries.pop_front() {
            Some((key, value)) => {
                self.prefetch = entries;
                self.pos = Position::At(key.clone());
                self.current = Some((key, value));
                Ok(true)
            }
            None => {
                self.pos = Position::PastLast;
                self.current = None;
                Ok(false)
            }
        }
    }

    fn key(&self) -> Option<&[u8]> {
        self.current.as_ref().map(|(key, _)| key.as_slice())
    }

    fn value(&self) -> Option<&[u8]> {
        self.current.as_ref().map(|(_, value)| value.as_slice())
    }
}
