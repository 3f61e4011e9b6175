//! Error type for expense domain operations.

use shared::FieldError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpenseError {
    #[error("invalid expense: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("index {index} is out of range for {len} expenses")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no expense with id '{0}'")]
    NotFound(String),

    #[error("malformed expense data: {0}")]
    Format(String),

    #[error("failed to persist expenses: {0}")]
    Persistence(String),

    #[error("month {0} is outside 1..=12")]
    InvalidMonth(u32),

    #[error("year {0} is outside the supported calendar range")]
    InvalidYear(i32),
}

impl ExpenseError {
    /// Wrap a storage failure, keeping the whole context chain in the message
    pub fn persistence(err: anyhow::Error) -> Self {
        ExpenseError::Persistence(format!("{:#}", err))
    }

    /// Field errors carried by a validation failure, empty for other kinds
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ExpenseError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type ExpenseResult<T> = Result<T, ExpenseError>;
