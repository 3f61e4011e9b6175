//! # JSON Storage Module
//!
//! File-based storage for the expense slot.
//!
//! ## File Structure
//!
//! ```text
//! data/
//! ├── config.yaml       ← optional settings, see `crate::config`
//! └── expenses.json     ← the expense slot
//! ```
//!
//! ## File Format
//!
//! ```json
//! [
//!   {"id": "5b0c…", "description": "Groceries", "amount": 42.5, "date": "2024-03-02", "category": "Food"},
//!   {"id": "9e41…", "description": "Bus ticket", "amount": 2.8, "date": "2024-03-03"}
//! ]
//! ```

pub mod connection;
pub mod expense_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::JsonConnection;
pub use expense_repository::ExpenseRepository;
