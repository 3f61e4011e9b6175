use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::connection::JsonConnection;
use crate::storage::traits::ExpenseStorage;

/// JSON file backed repository for one expense slot
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    connection: JsonConnection,
    slot: String,
}

impl ExpenseRepository {
    /// Create a new repository for the given slot
    pub fn new(connection: JsonConnection, slot: &str) -> Self {
        Self {
            connection,
            slot: slot.to_string(),
        }
    }

    /// Path of the file holding this slot
    pub fn file_path(&self) -> PathBuf {
        self.connection.slot_file_path(&self.slot)
    }

    fn temp_file_path(&self) -> PathBuf {
        let mut path = self.file_path();
        path.set_extension("json.tmp");
        path
    }
}

impl ExpenseStorage for ExpenseRepository {
    fn slot_name(&self) -> &str {
        &self.slot
    }

    fn read_blob(&self) -> Result<Option<String>> {
        let file_path = self.file_path();

        match fs::read_to_string(&file_path) {
            Ok(content) => {
                debug!("Read {} bytes from {}", content.len(), file_path.display());
                Ok(Some(content))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No persisted slot at {}", file_path.display());
                Ok(None)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", file_path.display())),
        }
    }

    fn write_blob(&self, blob: &str) -> Result<()> {
        let file_path = self.file_path();
        let temp_path = self.temp_file_path();

        // Write the whole blob next to the slot, then swap it in
        if let Err(e) = write_and_swap(&temp_path, &file_path, blob) {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!("Could not remove {}: {}", temp_path.display(), cleanup);
                }
            }
            return Err(e);
        }

        info!("Persisted slot '{}' ({} bytes)", self.slot, blob.len());
        Ok(())
    }
}

fn write_and_swap(temp_path: &Path, file_path: &Path, blob: &str) -> Result<()> {
    let mut file = File::create(temp_path)
        .with_context(|| format!("Failed to create {}", temp_path.display()))?;
    file.write_all(blob.as_bytes())
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;
    file.sync_all()
        .with_context(|| format!("Failed to flush {}", temp_path.display()))?;
    drop(file);

    fs::rename(temp_path, file_path)
        .with_context(|| format!("Failed to move {} into place", file_path.display()))
}
