//! Ordered key-value storage abstraction.
//!
//! This crate defines a uniform contract for ordered byte-keyed storage —
//! reads, writes, bidirectional iteration, prefix scans, and atomic
//! batches — together with backends that implement it, so callers can swap
//! engines without behavior change.
//!
//! # Core Traits
//!
//! - [`Storage`] - The full capability set: get/has, iteration, prefix
//!   scans, batching, close
//! - [`Write`] - Single-key put/delete
//! - [`Cursor`] - Bidirectional, seekable iteration in key order
//! - [`Batch`] - Staged mutations committed as one atomic unit
//!
//! # Backends
//!
//! - [`backends::MemoryStorage`] - In-memory reference engine
//! - [`backends::RedbStorage`] - Disk-backed engine on the Redb embedded
//!   database
//!
//! # Error Handling
//!
//! All operations return [`StorageResult<T>`], an alias for
//! `Result<T, StorageError>`. An absent key on `get` is the distinguished
//! [`StorageError::NotFound`]; operations after `close` fail with
//! [`StorageError::Closed`]; engine faults propagate verbatim through the
//! remaining variants.
//!
//! # Example
//!
//! ```
//! use ordkv::backends::MemoryStorage;
//! use ordkv::{Cursor, Storage, Write};
//!
//! # fn main() -> ordkv::StorageResult<()> {
//! let store = MemoryStorage::new();
//! store.put(b"ab", b"1")?;
//! store.put(b"abc", b"2")?;
//! store.put(b"b", b"3")?;
//!
//! // Prefix scans yield exactly the keys sharing the prefix, in order.
//! let mut cursor = store.prefix(b"ab")?;
//! let mut keys = Vec::new();
//! while cursor.next()? {
//!     keys.push(cursor.key().expect("positioned").to_vec());
//! }
//! assert_eq!(keys, vec![b"ab".to_vec(), b"abc".to_vec()]);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`engine`] - Contract traits, errors, and key-range utilities
//! - [`backends`] - Concrete storage backend implementations

pub mod backends;
pub mod engine;

pub use engine::{
    prefix_upper_bound, Batch, Cursor, KeyRange, KeyValue, Storage, StorageError, StorageResult,
    Write,
};
