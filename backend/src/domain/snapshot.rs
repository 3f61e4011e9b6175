//! Encoding and decoding of the expense list blob.
//!
//! The persisted slot and backup files share one format: a JSON array of
//! `{id, description, amount, date, category?}` objects. Decoding comes in two
//! flavours. Startup loading is lenient and keeps whatever entries are valid.
//! Import is strict and rejects the whole payload on the first bad entry.

use serde::Deserialize;
use serde_json::Value;
use shared::ExpenseRecord;
use std::collections::HashSet;
use tracing::warn;

use crate::domain::error::{ExpenseError, ExpenseResult};
use crate::domain::models::Expense;

/// Shape of one entry as read from disk. Older blobs carry no id and may use
/// `item` for the description.
#[derive(Debug, Deserialize)]
struct StoredExpense {
    #[serde(default)]
    id: Option<String>,
    #[serde(alias = "item")]
    description: String,
    amount: f64,
    date: String,
    #[serde(default)]
    category: Option<String>,
}

impl StoredExpense {
    fn into_expense(self, seen_ids: &mut HashSet<String>) -> ExpenseResult<Expense> {
        let record = ExpenseRecord {
            description: self.description,
            amount: self.amount,
            date: self.date,
            category: self.category,
        };

        let id = match self.id {
            Some(id) if !id.trim().is_empty() && !seen_ids.contains(&id) => id,
            _ => Expense::generate_id(),
        };
        let expense = Expense::from_record(id, &record)?;
        seen_ids.insert(expense.id.clone());
        Ok(expense)
    }
}

/// Compact encoding used for the persisted slot
pub fn encode_list(expenses: &[Expense]) -> serde_json::Result<String> {
    serde_json::to_string(expenses)
}

/// Pretty-printed encoding used for backups
pub fn encode_pretty(expenses: &[Expense]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(expenses)
}

/// Decode an import payload, failing on anything that is not a well-formed
/// array of valid expenses.
pub fn decode_strict(blob: &str) -> ExpenseResult<Vec<Expense>> {
    let value: Value = serde_json::from_str(blob)
        .map_err(|e| ExpenseError::Format(format!("not valid JSON: {}", e)))?;

    let entries = match value {
        Value::Array(entries) => entries,
        other => {
            return Err(ExpenseError::Format(format!(
                "expected a JSON array of expenses, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut seen_ids = HashSet::new();
    let mut expenses = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let stored: StoredExpense = serde_json::from_value(entry)
            .map_err(|e| ExpenseError::Format(format!("entry {}: {}", index, e)))?;
        let expense = stored
            .into_expense(&mut seen_ids)
            .map_err(|e| ExpenseError::Format(format!("entry {}: {}", index, e)))?;
        expenses.push(expense);
    }

    Ok(expenses)
}

/// Decode the persisted slot, keeping every valid entry and skipping the rest.
///
/// A blob that is not an array at all decodes to an empty list.
pub fn decode_lenient(blob: &str) -> Vec<Expense> {
    let entries = match serde_json::from_str::<Value>(blob) {
        Ok(Value::Array(entries)) => entries,
        Ok(other) => {
            warn!("⚠️ Persisted expenses are a JSON {}, not an array; starting empty", json_kind(&other));
            return Vec::new();
        }
        Err(e) => {
            warn!("⚠️ Persisted expenses are not valid JSON ({}); starting empty", e);
            return Vec::new();
        }
    };

    let mut seen_ids = HashSet::new();
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let decoded = serde_json::from_value::<StoredExpense>(entry)
                .map_err(|e| e.to_string())
                .and_then(|stored| stored.into_expense(&mut seen_ids).map_err(|e| e.to_string()));
            match decoded {
                Ok(expense) => Some(expense),
                Err(e) => {
                    warn!("⚠️ Skipping persisted expense {}: {}", index, e);
                    None
                }
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
