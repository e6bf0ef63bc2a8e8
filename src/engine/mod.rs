//! Storage contract traits and abstractions.
//!
//! This module defines the core traits that storage backends must implement:
//!
//! - [`Storage`] - The full capability set of a key-value store
//! - [`Write`] - The write half (single-key put/delete)
//! - [`Cursor`] - Ordered, bidirectional iteration over key-value pairs
//! - [`Batch`] - Staged mutations committed as one atomic unit
//!
//! # Error Handling
//!
//! All operations return [`StorageResult<T>`] which is an alias for
//! `Result<T, StorageError>`. See [`StorageError`] for the possible error
//! variants.

mod error;
mod range;
mod traits;

pub use error::{StorageError, StorageResult};
pub use range::{prefix_upper_bound, KeyRange};
pub(crate) use range::bounds_empty;
pub use traits::{Batch, Cursor, KeyValue, Storage, Write};
