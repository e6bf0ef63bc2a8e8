//! Storage backend implementations.
//!
//! This module contains concrete implementations of the storage contract.
//!
//! # Available Backends
//!
//! - [`memory`] - In-memory reference engine backed by a `BTreeMap`
//! - [`redb`] - Disk-backed engine using the Redb embedded database

pub mod memory;
pub mod redb;

pub use memory::{MemoryBatch, MemoryCursor, MemoryStorage};
pub use self::redb::{RedbBatch, RedbConfig, RedbCursor, RedbStorage};

#[cfg(test)]
mod proptest_tests;

/// Cursor position within its key window.
///
/// `Unpositioned` is the initial state. The two exhausted states are
/// directional: a forward-exhausted cursor sits past the last key, so a
/// `prev` from there lands on the last key, and symmetrically for
/// `BeforeFirst`. `seek` leaves any of these states.
#[derive(Debug, Clone)]
pub(crate) enum Position {
    /// No positioning call has happened yet.
    Unpositioned,
    /// Positioned on this key.
    At(Vec<u8>),
    /// Stepped backward past the first key in range.
    BeforeFirst,
    /// Stepped forward past the last key in range.
    PastLast,
}

/// A staged batch operation, recorded in call order.
#[derive(Debug, Clone)]
pub(crate) enum BatchOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}
