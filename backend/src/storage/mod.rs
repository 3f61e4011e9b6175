//! # Storage Module
//!
//! Handles all data persistence for the expense tracker.
//!
//! The expense list lives in one named slot holding a JSON array. This module
//! abstracts where that slot is kept so the domain layer can run against a
//! directory on disk or against memory in tests.
//!
//! ## Implementations
//!
//! - **json**: one `<slot>.json` file per slot inside the data directory,
//!   written through a temp file and renamed into place
//! - **memory**: an in-process slot, handy for collaborators that keep their
//!   own persistence and for exercising write failures

pub mod traits;
pub mod json;
pub mod memory;

pub use traits::{Connection, ExpenseStorage};
pub use json::{ExpenseRepository, JsonConnection};
pub use memory::MemoryStorage;
