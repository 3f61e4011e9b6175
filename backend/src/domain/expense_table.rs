//! Expense table domain logic for the expense tracker.
//!
//! This module turns stored expenses into display rows for the expense table
//! and turns raw entry-form input into records the store can accept.
//!
//! ## Key Responsibilities
//!
//! - **Table Formatting**: Converting expenses into formatted display rows
//! - **Amount Formatting**: Two decimals with an optional currency symbol
//! - **Date Formatting**: ISO, short and long date styles
//! - **Form Parsing**: Cleaning and validating entry-form input field by field
//! - **Validation Messages**: User-facing text for each field error

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use shared::{ExpenseRecord, FieldError, FormattedExpense};

use crate::domain::error::{ExpenseError, ExpenseResult};
use crate::domain::models::expense::validate_record;
use crate::domain::models::Expense;

/// Configuration for expense table display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseTableConfig {
    pub show_currency_symbol: bool,
    pub currency_symbol: String,
    pub date_format: DateFormat,
}

/// Date formatting options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DateFormat {
    MonthDayYear, // "March 2, 2024"
    ShortDate,    // "03/02/2024"
    ISO,          // "2024-03-02"
}

/// Expense table service that handles table presentation and form input
#[derive(Debug, Clone)]
pub struct ExpenseTableService {
    config: ExpenseTableConfig,
}

impl ExpenseTableService {
    /// Create a new ExpenseTableService with default configuration
    pub fn new() -> Self {
        Self {
            config: ExpenseTableConfig::default(),
        }
    }

    /// Create a new ExpenseTableService with custom configuration
    pub fn with_config(config: ExpenseTableConfig) -> Self {
        Self { config }
    }

    /// Format a list of expenses for table display
    pub fn format_expenses(&self, expenses: &[Expense]) -> Vec<FormattedExpense> {
        expenses.iter().map(|e| self.format_expense(e)).collect()
    }

    /// Format a single expense for display
    pub fn format_expense(&self, expense: &Expense) -> FormattedExpense {
        FormattedExpense {
            id: expense.id.clone(),
            formatted_date: self.format_date(expense.date),
            description: expense.description.clone(),
            category: expense.effective_category().to_string(),
            formatted_amount: self.format_amount(expense.amount),
            raw_amount: expense.amount,
            raw_date: expense.date,
        }
    }

    /// Format a date for display based on configuration
    pub fn format_date(&self, date: NaiveDate) -> String {
        match self.config.date_format {
            DateFormat::MonthDayYear => {
                format!("{} {}, {}", date.format("%B"), date.day(), date.year())
            }
            DateFormat::ShortDate => date.format("%m/%d/%Y").to_string(),
            DateFormat::ISO => date.format("%Y-%m-%d").to_string(),
        }
    }

    /// Format an amount with exactly two decimals
    pub fn format_amount(&self, amount: f64) -> String {
        let currency = if self.config.show_currency_symbol {
            self.config.currency_symbol.as_str()
        } else {
            ""
        };
        format!("{}{:.2}", currency, amount)
    }

    /// Clean and parse amount input string
    pub fn clean_and_parse_amount(&self, amount_input: &str) -> Result<f64> {
        // Drop currency symbols, grouping commas and spaces
        let cleaned = amount_input
            .trim()
            .replace(self.config.currency_symbol.as_str(), "")
            .replace('$', "")
            .replace(',', "")
            .replace(' ', "");

        cleaned
            .parse::<f64>()
            .map_err(|e| anyhow::anyhow!("Invalid number format: {}", e))
    }

    /// Turn raw entry-form fields into a record, reporting every bad field.
    ///
    /// A blank category becomes `None`.
    pub fn parse_form(
        &self,
        description: &str,
        amount_input: &str,
        date: &str,
        category: Option<&str>,
    ) -> ExpenseResult<ExpenseRecord> {
        let amount = self.clean_and_parse_amount(amount_input).ok();
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        let record = ExpenseRecord::new(description.trim(), amount.unwrap_or(0.0), date.trim(), category);

        let mut errors: Vec<FieldError> = match validate_record(&record) {
            Ok(_) => Vec::new(),
            Err(ExpenseError::Validation(errors)) => errors,
            Err(other) => return Err(other),
        };

        if amount.is_none() {
            let at = errors
                .iter()
                .position(|e| e.field() == "date")
                .unwrap_or(errors.len());
            errors.insert(at, FieldError::InvalidAmount(amount_input.trim().to_string()));
        }

        if errors.is_empty() {
            Ok(record)
        } else {
            Err(ExpenseError::Validation(errors))
        }
    }

    /// Get error message for validation error
    pub fn validation_error_message(&self, error: &FieldError) -> String {
        match error {
            FieldError::EmptyDescription => "Please enter a description".to_string(),
            FieldError::InvalidAmount(raw) => {
                format!("Please enter a valid amount (like 5 or 5.00), not '{}'", raw)
            }
            FieldError::NegativeAmount => "Amount cannot be negative".to_string(),
            FieldError::EmptyDate => "Please pick a date".to_string(),
            FieldError::InvalidDate(raw) => {
                format!("'{}' is not a valid date, use YYYY-MM-DD", raw)
            }
        }
    }

    /// Get all validation error messages
    pub fn validation_error_messages(&self, errors: &[FieldError]) -> Vec<String> {
        errors.iter().map(|e| self.validation_error_message(e)).collect()
    }
}

impl Default for ExpenseTableService {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ExpenseTableConfig {
    fn default() -> Self {
        Self {
            show_currency_symbol: true,
            currency_symbol: "$".to_string(),
            date_format: DateFormat::ISO,
        }
    }
}
