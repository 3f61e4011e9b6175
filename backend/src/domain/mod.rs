//! # Domain Layer
//!
//! Business logic of the expense tracker. Services here operate on plain
//! domain models and know nothing about how the UI draws them.
//!
//! ## Services
//!
//! - **ExpenseStore**: the canonical expense list and its persistence
//! - **QueryEngine**: totals, table views and chart series
//! - **CalendarService**: month grids and month cursors
//! - **ExpenseTableService**: table formatting and entry-form parsing
//! - **ExportService**: JSON backups and CSV export

pub mod calendar;
pub mod error;
pub mod expense_store;
pub mod expense_table;
pub mod export_service;
pub mod models;
pub mod query;
pub mod snapshot;

pub use calendar::{CalendarService, MonthCursor};
pub use error::{ExpenseError, ExpenseResult};
pub use expense_store::ExpenseStore;
pub use expense_table::{DateFormat, ExpenseTableConfig, ExpenseTableService};
pub use export_service::ExportService;
pub use models::Expense;
pub use query::QueryEngine;
