//! Expense store domain logic for the expense tracker.
//!
//! The store owns the canonical, insertion-ordered expense list and is the
//! only writer of the persisted slot. Every mutation is validated first, then
//! applied in memory, then written through to storage before the call returns.
//!
//! ## Addressing
//!
//! Expenses can be addressed two ways:
//!
//! - **By position**: the index into the current list, which shifts down
//!   after a removal. This is what the entry form and table rows use.
//! - **By id**: a stable UUID assigned when the expense is first stored.
//!
//! ## Persistence failures
//!
//! When the write after a mutation fails, the call returns
//! `ExpenseError::Persistence` but the in-memory list keeps the mutation.
//! The next successful write brings storage back in line.

use shared::{ExpenseRecord, ImportSummary};
use tracing::{debug, error, info, warn};

use crate::domain::error::{ExpenseError, ExpenseResult};
use crate::domain::models::Expense;
use crate::domain::snapshot;
use crate::storage::ExpenseStorage;

pub struct ExpenseStore<S: ExpenseStorage> {
    storage: S,
    expenses: Vec<Expense>,
}

impl<S: ExpenseStorage> ExpenseStore<S> {
    /// Open a store over the given slot, loading whatever it holds
    pub fn open(storage: S) -> Self {
        let expenses = Self::load(&storage);
        info!(
            "📂 STORE: Opened slot '{}' with {} expenses",
            storage.slot_name(),
            expenses.len()
        );
        Self { storage, expenses }
    }

    /// Read the persisted list.
    ///
    /// Never fails: a missing slot, an unreadable slot or a corrupt blob all
    /// yield an empty list, and invalid entries are skipped.
    pub fn load(storage: &S) -> Vec<Expense> {
        match storage.read_blob() {
            Ok(Some(blob)) => snapshot::decode_lenient(&blob),
            Ok(None) => {
                debug!("No persisted expenses in slot '{}'", storage.slot_name());
                Vec::new()
            }
            Err(e) => {
                warn!(
                    "⚠️ STORE: Could not read slot '{}': {:#}; starting empty",
                    storage.slot_name(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Discard the in-memory list and read the slot again
    pub fn reload(&mut self) {
        self.expenses = Self::load(&self.storage);
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// A point-in-time copy of the list for the query layer
    pub fn snapshot(&self) -> Vec<Expense> {
        self.expenses.clone()
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Record at `index`, as used to pre-fill the edit form
    pub fn get(&self, index: usize) -> ExpenseResult<ExpenseRecord> {
        self.expenses
            .get(index)
            .map(Expense::to_record)
            .ok_or(ExpenseError::IndexOutOfRange {
                index,
                len: self.expenses.len(),
            })
    }

    pub fn get_by_id(&self, id: &str) -> ExpenseResult<&Expense> {
        self.expenses
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| ExpenseError::NotFound(id.to_string()))
    }

    /// Current position of the expense with the given id
    pub fn position_of(&self, id: &str) -> ExpenseResult<usize> {
        self.expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| ExpenseError::NotFound(id.to_string()))
    }

    /// Validate and append a new expense, returning its id
    pub fn add(&mut self, record: &ExpenseRecord) -> ExpenseResult<String> {
        let expense = Expense::from_record(Expense::generate_id(), record)?;
        let id = expense.id.clone();

        info!(
            "➕ STORE: Adding expense '{}' ({:.2}) on {}",
            expense.description, expense.amount, expense.date
        );
        self.expenses.push(expense);
        self.persist()?;
        Ok(id)
    }

    /// Replace the expense at `index` wholesale, keeping its id
    pub fn update(&mut self, index: usize, record: &ExpenseRecord) -> ExpenseResult<()> {
        let len = self.expenses.len();
        let id = match self.expenses.get(index) {
            Some(existing) => existing.id.clone(),
            None => return Err(ExpenseError::IndexOutOfRange { index, len }),
        };
        let updated = Expense::from_record(id, record)?;

        info!("✏️ STORE: Updating expense at position {} ({})", index, updated.id);
        self.expenses[index] = updated;
        self.persist()
    }

    pub fn update_by_id(&mut self, id: &str, record: &ExpenseRecord) -> ExpenseResult<()> {
        let index = self.position_of(id)?;
        self.update(index, record)
    }

    /// Remove the expense at `index`; later expenses shift down by one
    pub fn remove(&mut self, index: usize) -> ExpenseResult<Expense> {
        if index >= self.expenses.len() {
            return Err(ExpenseError::IndexOutOfRange {
                index,
                len: self.expenses.len(),
            });
        }

        let removed = self.expenses.remove(index);
        info!(
            "🗑️ STORE: Removed expense '{}' at position {}",
            removed.description, index
        );
        self.persist()?;
        Ok(removed)
    }

    pub fn remove_by_id(&mut self, id: &str) -> ExpenseResult<Expense> {
        let index = self.position_of(id)?;
        self.remove(index)
    }

    /// Remove every expense
    pub fn clear(&mut self) -> ExpenseResult<()> {
        info!("🧹 STORE: Clearing {} expenses", self.expenses.len());
        self.expenses.clear();
        self.persist()
    }

    /// Serialize the current list as pretty-printed JSON
    pub fn export_snapshot(&self) -> ExpenseResult<String> {
        snapshot::encode_pretty(&self.expenses)
            .map_err(|e| ExpenseError::Format(format!("could not encode expenses: {}", e)))
    }

    /// Replace the whole list with the contents of a snapshot.
    ///
    /// Nothing changes unless the entire payload is valid.
    pub fn import_snapshot(&mut self, blob: &str) -> ExpenseResult<ImportSummary> {
        let imported = match snapshot::decode_strict(blob) {
            Ok(imported) => imported,
            Err(e) => {
                error!("❌ STORE: Rejected import: {}", e);
                return Err(e);
            }
        };

        let summary = ImportSummary {
            imported_count: imported.len(),
            replaced_count: self.expenses.len(),
        };
        info!(
            "📥 STORE: Importing {} expenses, replacing {}",
            summary.imported_count, summary.replaced_count
        );

        self.expenses = imported;
        self.persist()?;
        Ok(summary)
    }

    fn persist(&self) -> ExpenseResult<()> {
        let blob = snapshot::encode_list(&self.expenses)
            .map_err(|e| ExpenseError::Persistence(format!("could not encode expenses: {}", e)))?;

        self.storage.write_blob(&blob).map_err(|e| {
            error!(
                "❌ STORE: Failed to persist slot '{}': {:#}",
                self.storage.slot_name(),
                e
            );
            ExpenseError::persistence(e)
        })
    }
}
