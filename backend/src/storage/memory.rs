//! In-process expense slot.
//!
//! Clones share the same slot, so a second store opened on a clone sees what
//! the first one persisted, the same way two stores over one data directory do.

use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::storage::traits::ExpenseStorage;

#[derive(Debug, Clone)]
pub struct MemoryStorage {
    slot: String,
    blob: Arc<Mutex<Option<String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new(slot: &str) -> Self {
        Self {
            slot: slot.to_string(),
            blob: Arc::new(Mutex::new(None)),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start with an existing blob in the slot
    pub fn with_blob(slot: &str, blob: &str) -> Self {
        let storage = Self::new(slot);
        if let Ok(mut guard) = storage.blob.lock() {
            *guard = Some(blob.to_string());
        }
        storage
    }

    /// Make every following write fail, as a full disk or quota would
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl ExpenseStorage for MemoryStorage {
    fn slot_name(&self) -> &str {
        &self.slot
    }

    fn read_blob(&self) -> Result<Option<String>> {
        let guard = self
            .blob
            .lock()
            .map_err(|_| anyhow!("memory slot '{}' is poisoned", self.slot))?;
        Ok(guard.clone())
    }

    fn write_blob(&self, blob: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("storage quota exceeded for slot '{}'", self.slot));
        }

        let mut guard = self
            .blob
            .lock()
            .map_err(|_| anyhow!("memory slot '{}' is poisoned", self.slot))?;
        *guard = Some(blob.to_string());
        Ok(())
    }
}
