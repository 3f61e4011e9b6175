//! Export service domain logic for the expense tracker.
//!
//! This module produces the two export formats: a pretty-printed JSON backup
//! that can be imported again, and a CSV sheet for spreadsheets. It also owns
//! naming and writing those files and reading a backup back in.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use shared::ExportDataResponse;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::domain::error::ExpenseResult;
use crate::domain::expense_store::ExpenseStore;
use crate::domain::models::Expense;
use crate::storage::ExpenseStorage;

/// One row of the CSV export
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    date: String,
    description: &'a str,
    category: &'a str,
    amount: String,
}

/// Export service that handles backup and CSV export
#[derive(Debug, Clone, Default)]
pub struct ExportService;

impl ExportService {
    /// Create a new ExportService instance
    pub fn new() -> Self {
        Self
    }

    /// File name of a backup taken on `today`
    pub fn backup_filename(&self, today: NaiveDate) -> String {
        format!("expenses_backup_{}.json", today.format("%Y-%m-%d"))
    }

    /// File name of a CSV export taken on `today`
    pub fn csv_filename(&self, today: NaiveDate) -> String {
        format!("expenses_{}.csv", today.format("%Y%m%d"))
    }

    /// Build a JSON backup of everything in the store
    pub fn export_backup<S: ExpenseStorage>(
        &self,
        store: &ExpenseStore<S>,
        today: NaiveDate,
    ) -> ExpenseResult<ExportDataResponse> {
        let content = store.export_snapshot()?;

        info!("📄 EXPORT: Built backup of {} expenses", store.len());
        Ok(ExportDataResponse {
            content,
            filename: self.backup_filename(today),
            expense_count: store.len(),
        })
    }

    /// Build a CSV sheet of the given expenses, oldest first
    pub fn export_csv(&self, expenses: &[Expense], today: NaiveDate) -> Result<ExportDataResponse> {
        let mut sorted: Vec<&Expense> = expenses.iter().collect();
        sorted.sort_by(|a, b| a.date.cmp(&b.date));

        let mut writer = csv::Writer::from_writer(vec![]);
        for expense in &sorted {
            writer
                .serialize(CsvRow {
                    date: expense.date.format("%Y-%m-%d").to_string(),
                    description: &expense.description,
                    category: expense.effective_category(),
                    amount: format!("{:.2}", expense.amount),
                })
                .context("Failed to write CSV row")?;
        }
        if sorted.is_empty() {
            writer
                .write_record(["date", "description", "category", "amount"])
                .context("Failed to write CSV header")?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush CSV export: {}", e.error()))?;
        let content = String::from_utf8(bytes).context("CSV export is not valid UTF-8")?;

        info!("📄 EXPORT: Built CSV of {} expenses ({} bytes)", sorted.len(), content.len());
        Ok(ExportDataResponse {
            content,
            filename: self.csv_filename(today),
            expense_count: sorted.len(),
        })
    }

    /// Write an export into `directory`, creating it if needed
    pub fn write_to_directory(&self, export: &ExportDataResponse, directory: &Path) -> Result<PathBuf> {
        fs::create_dir_all(directory).with_context(|| {
            format!("Failed to create export directory {}", directory.display())
        })?;

        let file_path = directory.join(&export.filename);
        if let Err(e) = fs::write(&file_path, &export.content) {
            error!("❌ EXPORT: Failed to write {}: {}", file_path.display(), e);
            return Err(e).with_context(|| format!("Failed to write {}", file_path.display()));
        }

        info!(
            "✅ EXPORT: Wrote {} expenses to {}",
            export.expense_count,
            file_path.display()
        );
        Ok(file_path)
    }

    /// Directory to export into: the user's choice when given, else `fallback`
    pub fn resolve_export_directory(&self, custom_path: Option<&str>, fallback: &Path) -> PathBuf {
        match custom_path {
            Some(path) if !path.trim().is_empty() => PathBuf::from(self.sanitize_path(path)),
            _ => fallback.to_path_buf(),
        }
    }

    /// Read a backup file for import
    pub fn read_backup(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read backup {}", path.display()))
    }

    /// Basic path sanitization to handle common user input issues
    pub fn sanitize_path(&self, path: &str) -> String {
        let mut cleaned = path.trim().to_string();

        // Remove surrounding quotes (single or double)
        if cleaned.len() >= 2
            && ((cleaned.starts_with('"') && cleaned.ends_with('"'))
                || (cleaned.starts_with('\'') && cleaned.ends_with('\'')))
        {
            cleaned = cleaned[1..cleaned.len() - 1].trim().to_string();
        }

        // Escaped spaces from shell copy-paste
        cleaned = cleaned.replace("\\ ", " ");

        while cleaned.len() > 1 && (cleaned.ends_with('/') || cleaned.ends_with('\\')) {
            cleaned.pop();
        }

        if cleaned.starts_with('~') {
            if let Some(home) = dirs::home_dir() {
                if cleaned == "~" {
                    cleaned = home.to_string_lossy().to_string();
                } else if cleaned.starts_with("~/") || cleaned.starts_with("~\\") {
                    cleaned = home.join(&cleaned[2..]).to_string_lossy().to_string();
                }
            }
        }

        cleaned
    }

    /// Documents folder, falling back to the home directory
    pub fn default_export_directory() -> Option<PathBuf> {
        dirs::document_dir().or_else(dirs::home_dir)
    }
}
