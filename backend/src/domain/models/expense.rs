//! Domain model for an expense.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{ExpenseRecord, FieldError, YearMonth, UNCATEGORIZED};

use crate::domain::error::{ExpenseError, ExpenseResult};

/// A validated expense as held by the store.
///
/// Every instance satisfies: non-empty trimmed description, finite amount
/// `>= 0`, a real calendar date, and a category that is either absent or
/// non-blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Expense {
    /// Generate a new stable expense id (UUID v4).
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Validate a submitted record and attach the given id
    pub fn from_record(id: String, record: &ExpenseRecord) -> ExpenseResult<Self> {
        let (description, amount, date) = validate_record(record)?;

        Ok(Self {
            id,
            description,
            amount,
            date,
            category: normalize_category(record.category.as_deref()),
        })
    }

    /// The record form handed back to the UI to pre-fill the entry form
    pub fn to_record(&self) -> ExpenseRecord {
        ExpenseRecord {
            description: self.description.clone(),
            amount: self.amount,
            date: self.date.format("%Y-%m-%d").to_string(),
            category: self.category.clone(),
        }
    }

    /// Category used for filtering, sorting and aggregation
    pub fn effective_category(&self) -> &str {
        self.category.as_deref().unwrap_or(UNCATEGORIZED)
    }

    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.date)
    }
}

/// Check every field of a record, collecting all failures at once.
///
/// Returns the trimmed description, the amount and the parsed date.
pub fn validate_record(record: &ExpenseRecord) -> ExpenseResult<(String, f64, NaiveDate)> {
    let mut errors = Vec::new();

    let description = record.description.trim();
    if description.is_empty() {
        errors.push(FieldError::EmptyDescription);
    }

    if !record.amount.is_finite() {
        errors.push(FieldError::InvalidAmount(record.amount.to_string()));
    } else if record.amount < 0.0 {
        errors.push(FieldError::NegativeAmount);
    }

    let date = match parse_iso_date(&record.date) {
        Ok(date) => Some(date),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    match (errors.is_empty(), date) {
        (true, Some(date)) => Ok((description.to_string(), record.amount, date)),
        _ => Err(ExpenseError::Validation(errors)),
    }
}

/// Parse a strict `YYYY-MM-DD` date
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::EmptyDate);
    }
    // chrono accepts signs and unpadded fields, the stored format is DDDD-DD-DD
    if !is_iso_date_shape(trimmed) {
        return Err(FieldError::InvalidDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| FieldError::InvalidDate(raw.to_string()))
}

fn is_iso_date_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn normalize_category(category: Option<&str>) -> Option<String> {
    category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| c.to_string())
}
