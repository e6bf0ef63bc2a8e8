//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The key is not present in the store.
    ///
    /// This is an expected outcome of `get` on an absent key, not a fault.
    /// Callers branch on it via [`StorageError::is_not_found`] rather than
    /// treating it as exceptional.
    #[error("key not found")]
    NotFound,

    /// The storage handle has been closed.
    ///
    /// Returned by every operation issued after `close`, including
    /// operations on outstanding cursors and uncommitted batches. The
    /// caller must not retry on the same handle.
    #[error("storage is closed")]
    Closed,

    /// The backing database could not be opened.
    #[error("failed to open database: {0}")]
    Open(String),

    /// An underlying engine failure (I/O error, corruption, capacity
    /// exhaustion). The engine's message is carried verbatim; retry policy
    /// belongs to the caller.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Whether this error is the expected absent-key outcome of a lookup.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Whether this error indicates the handle was closed.
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}
