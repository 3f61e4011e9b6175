//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use anyhow::Result;

/// Trait defining the interface for the persisted expense slot
///
/// The expense list is persisted as a single serialized blob in a named slot.
/// The storage layer only moves that blob in and out; encoding and decoding
/// belong to the domain layer so that import and load share one format.
///
/// All operations are synchronous and complete before returning.
pub trait ExpenseStorage: Send + Sync {
    /// Name of the slot this storage reads and writes
    fn slot_name(&self) -> &str;

    /// Read the persisted blob
    /// Returns `None` when nothing has ever been written to the slot
    fn read_blob(&self) -> Result<Option<String>>;

    /// Replace the persisted blob
    fn write_blob(&self, blob: &str) -> Result<()>;
}

/// Trait defining the interface for storage connections
///
/// A connection knows where data lives and hands out repositories bound to a
/// named slot, so the domain layer never deals with paths directly.
pub trait Connection: Send + Sync + Clone {
    /// The type of ExpenseStorage this connection creates
    type ExpenseRepository: ExpenseStorage;

    /// Create a new expense repository for the given slot
    fn create_expense_repository(&self, slot: &str) -> Self::ExpenseRepository;
}
