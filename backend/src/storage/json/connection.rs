use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::expense_repository::ExpenseRepository;
use crate::storage::traits::Connection;

/// JsonConnection manages the data directory and the slot files inside it
#[derive(Debug, Clone)]
pub struct JsonConnection {
    base_directory: PathBuf,
}

impl JsonConnection {
    /// Create a new JSON connection rooted at a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).with_context(|| {
                format!("Failed to create data directory {}", base_path.display())
            })?;
            info!("Created data directory {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Get the base directory path
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Get the file path backing a named slot
    pub fn slot_file_path(&self, slot: &str) -> PathBuf {
        self.base_directory.join(format!("{}.json", Self::safe_slot_name(slot)))
    }

    /// Reduce a slot name to characters that are safe in a file name
    pub fn safe_slot_name(slot: &str) -> String {
        let cleaned: String = slot
            .trim()
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();

        if cleaned.is_empty() {
            "expenses".to_string()
        } else {
            cleaned
        }
    }
}

impl Connection for JsonConnection {
    type ExpenseRepository = ExpenseRepository;

    fn create_expense_repository(&self, slot: &str) -> Self::ExpenseRepository {
        ExpenseRepository::new(self.clone(), slot)
    }
}
