//! Redb storage backend.
//!
//! Implements the storage contract on top of the Redb embedded database, a
//! pure-Rust store with ACID transactions. All keys live in a single
//! physical table; handle-level reads and writes each use one short
//! transaction, batches apply their log in a single write transaction, and
//! cursors hold a read transaction taken when they were opened.

mod cursor;
mod store;

pub use cursor::RedbCursor;
pub use store::{RedbBatch, RedbConfig, RedbStorage};

use redb::TableDefinition;

/// The single physical table that stores the mapping.
pub(crate) const DATA_TABLE: TableDefinition<'static, &[u8], &[u8]> =
    TableDefinition::new("ordkv_data");
