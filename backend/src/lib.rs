//! # Expense Tracker Backend
//!
//! Core of the expense tracker: the expense store, the queries behind the
//! table, charts and calendar, and local persistence and backup.
//!
//! The UI is a collaborator that calls into [`Backend`] with form input and
//! view settings and gets plain computed values back. This crate:
//! - Uses synchronous operations (no async/await)
//! - Keeps all state in one explicit context object
//! - Persists after every mutation

use anyhow::{Context, Result};
use chrono::NaiveDate;
use shared::{
    CalendarGrid, CategoryTotal, ExpenseListOptions, ExpenseRecord, FormattedExpense,
    ImportSummary, MonthTotal,
};
use std::path::{Path, PathBuf};
use tracing::info;

pub mod config;
pub mod domain;
pub mod storage;

pub use config::Config;
pub use domain::{ExpenseError, ExpenseResult};
pub use storage::{Connection, ExpenseRepository, JsonConnection};

use domain::{
    CalendarService, Expense, ExpenseStore, ExpenseTableService, ExportService, MonthCursor,
    QueryEngine,
};

/// Main backend struct that owns the store, the services and the view cursors
pub struct Backend {
    pub config: Config,
    pub expense_store: ExpenseStore<ExpenseRepository>,
    pub query_engine: QueryEngine,
    pub calendar_service: CalendarService,
    pub expense_table_service: ExpenseTableService,
    pub export_service: ExportService,
    /// Month shown by the calendar view
    pub calendar_cursor: MonthCursor,
    /// Month the charts are anchored on
    pub chart_cursor: MonthCursor,
}

impl Backend {
    /// Create a backend over the configured data directory and slot
    pub fn new(config: Config) -> Result<Self> {
        let connection = JsonConnection::new(&config.data_directory)?;
        let expense_store =
            ExpenseStore::open(connection.create_expense_repository(&config.storage_slot));

        info!(
            "Backend ready: {} expenses in {}",
            expense_store.len(),
            config.data_directory.display()
        );

        Ok(Backend {
            config,
            expense_store,
            query_engine: QueryEngine::new(),
            calendar_service: CalendarService::new(),
            expense_table_service: ExpenseTableService::new(),
            export_service: ExportService::new(),
            calendar_cursor: MonthCursor::current_month(),
            chart_cursor: MonthCursor::current_month(),
        })
    }

    /// Handle the entry form: add a new expense, or replace the one at
    /// `editing_index` when the form was opened for editing.
    ///
    /// Returns the id of the stored expense.
    pub fn submit(
        &mut self,
        description: &str,
        amount_input: &str,
        date: &str,
        category: Option<&str>,
        editing_index: Option<usize>,
    ) -> ExpenseResult<String> {
        let record = self
            .expense_table_service
            .parse_form(description, amount_input, date, category)?;
        self.save_record(&record, editing_index)
    }

    /// Store an already-built record, as `submit` does after parsing
    pub fn save_record(&mut self, record: &ExpenseRecord, editing_index: Option<usize>) -> ExpenseResult<String> {
        match editing_index {
            Some(index) => {
                self.expense_store.update(index, record)?;
                Ok(self.expense_store.expenses()[index].id.clone())
            }
            None => self.expense_store.add(record),
        }
    }

    /// Record at `index` for pre-filling the edit form
    pub fn edit_request(&self, index: usize) -> ExpenseResult<ExpenseRecord> {
        self.expense_store.get(index)
    }

    pub fn delete_request(&mut self, index: usize) -> ExpenseResult<Expense> {
        self.expense_store.remove(index)
    }

    /// Filtered, sorted and formatted table rows
    pub fn table(&self, options: &ExpenseListOptions) -> Vec<FormattedExpense> {
        let view = self
            .query_engine
            .filtered_sorted(self.expense_store.expenses(), options);
        self.expense_table_service.format_expenses(&view)
    }

    /// Total of every expense
    pub fn total(&self) -> f64 {
        self.query_engine.total(self.expense_store.expenses())
    }

    /// Three-month window around the chart cursor
    pub fn monthly_chart(&self) -> Vec<MonthTotal> {
        self.query_engine
            .monthly_totals(self.expense_store.expenses(), self.chart_cursor.current())
    }

    /// Category breakdown for the chart cursor's month
    pub fn category_chart(&self) -> Vec<CategoryTotal> {
        self.query_engine
            .category_totals(self.expense_store.expenses(), self.chart_cursor.current())
    }

    /// Grid for the calendar cursor's month
    pub fn calendar(&self) -> ExpenseResult<CalendarGrid> {
        let month = self.calendar_cursor.current();
        self.calendar_service
            .layout(self.expense_store.expenses(), month.year(), month.month())
    }

    /// Formatted expenses dated `date`, for the calendar's day detail
    pub fn day_detail(&self, date: NaiveDate) -> Vec<FormattedExpense> {
        let on_day = self
            .query_engine
            .expenses_on(self.expense_store.expenses(), date);
        self.expense_table_service.format_expenses(&on_day)
    }

    /// Write a JSON backup into `directory`, or the configured backup directory
    pub fn export_backup_to(&self, directory: Option<&str>, today: NaiveDate) -> Result<PathBuf> {
        let export = self.export_service.export_backup(&self.expense_store, today)?;
        let target = self
            .export_service
            .resolve_export_directory(directory, &self.config.backup_directory);
        self.export_service.write_to_directory(&export, &target)
    }

    /// Replace every expense with the contents of a backup file
    pub fn import_backup_from(&mut self, path: &Path) -> Result<ImportSummary> {
        let blob = self.export_service.read_backup(path)?;
        let summary = self
            .expense_store
            .import_snapshot(&blob)
            .with_context(|| format!("Failed to import {}", path.display()))?;
        Ok(summary)
    }

    /// Write a CSV sheet of every expense
    pub fn export_csv_to(&self, directory: Option<&str>, today: NaiveDate) -> Result<PathBuf> {
        let export = self
            .export_service
            .export_csv(self.expense_store.expenses(), today)?;
        let target = self
            .export_service
            .resolve_export_directory(directory, &self.config.backup_directory);
        self.export_service.write_to_directory(&export, &target)
    }
}
