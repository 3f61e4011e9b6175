use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category used for aggregation and sorting when an expense has none
pub const UNCATEGORIZED: &str = "Other";

/// The fields of an expense as submitted by the entry form.
///
/// This is the value the UI hands to the store on add/update and the value it
/// gets back on an edit request to pre-fill the form. The date is kept as the
/// raw `YYYY-MM-DD` text so that validation can report it field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Label of the expense (the earliest data files call this `item`)
    #[serde(alias = "item")]
    pub description: String,
    /// Amount spent, non-negative
    pub amount: f64,
    /// ISO calendar date (`YYYY-MM-DD`)
    pub date: String,
    /// Optional category label, treated as "Other" when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ExpenseRecord {
    pub fn new(description: &str, amount: f64, date: &str, category: Option<&str>) -> Self {
        Self {
            description: description.to_string(),
            amount,
            date: date.to_string(),
            category: category.map(|c| c.to_string()),
        }
    }
}

/// A single field-level validation failure for an expense record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum FieldError {
    EmptyDescription,
    InvalidAmount(String),
    NegativeAmount,
    EmptyDate,
    InvalidDate(String),
}

impl FieldError {
    /// Name of the record field this error refers to
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::EmptyDescription => "description",
            FieldError::InvalidAmount(_) | FieldError::NegativeAmount => "amount",
            FieldError::EmptyDate | FieldError::InvalidDate(_) => "date",
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::EmptyDescription => write!(f, "description must not be empty"),
            FieldError::InvalidAmount(raw) => write!(f, "amount '{}' is not a finite number", raw),
            FieldError::NegativeAmount => write!(f, "amount must not be negative"),
            FieldError::EmptyDate => write!(f, "date must not be empty"),
            FieldError::InvalidDate(raw) => write!(f, "date '{}' is not a valid YYYY-MM-DD date", raw),
        }
    }
}

/// A calendar month, ordered chronologically.
///
/// Months are one-based (1 = January). Serialized as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    /// Day 1 of the month
    first: NaiveDate,
}

impl YearMonth {
    /// Build a month, returning `None` when `month` is outside 1..=12 or the
    /// year is outside the range chrono can represent
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            first: date - Duration::days(i64::from(date.day0())),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    /// The following month, rolling over into the next year after December.
    /// Saturates at the last representable month.
    pub fn next(&self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Self { first })
            .unwrap_or(*self)
    }

    /// The preceding month, rolling back into the previous year before January.
    /// Saturates at the first representable month.
    pub fn previous(&self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| Self { first })
            .unwrap_or(*self)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        YearMonth::from_date(date) == *self
    }

    pub fn is_leap_year(&self) -> bool {
        let year = self.year();
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    /// Number of days in the month (proleptic Gregorian)
    pub fn days_in_month(&self) -> u32 {
        match self.month() {
            2 => {
                if self.is_leap_year() {
                    29
                } else {
                    28
                }
            }
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// Weekday of day 1, with Sunday = 0 ... Saturday = 6
    pub fn first_weekday(&self) -> u32 {
        self.first_day().weekday().num_days_from_sunday()
    }

    pub fn month_name(&self) -> &'static str {
        match self.month() {
            1 => "January", 2 => "February", 3 => "March", 4 => "April",
            5 => "May", 6 => "June", 7 => "July", 8 => "August",
            9 => "September", 10 => "October", 11 => "November", 12 => "December",
            _ => "Invalid Month",
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Error returned when a `YYYY-MM` month key cannot be parsed
#[derive(Debug, Clone, PartialEq)]
pub struct YearMonthParseError(pub String);

impl fmt::Display for YearMonthParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid month '{}', expected YYYY-MM", self.0)
    }
}

impl std::error::Error for YearMonthParseError {}

impl FromStr for YearMonth {
    type Err = YearMonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || YearMonthParseError(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        let year = year.parse::<i32>().map_err(|_| err())?;
        let month = month.parse::<u32>().map_err(|_| err())?;
        YearMonth::new(year, month).ok_or_else(err)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = YearMonthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Ordering applied to the expense table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    /// Insertion order
    #[default]
    None,
    DateAsc,
    DateDesc,
    AmountAsc,
    AmountDesc,
    /// Lexicographic by category, uncategorized entries sorting as "Other"
    Category,
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(SortOption::None),
            "date-asc" => Ok(SortOption::DateAsc),
            "date-desc" => Ok(SortOption::DateDesc),
            "amount-asc" => Ok(SortOption::AmountAsc),
            "amount-desc" => Ok(SortOption::AmountDesc),
            "category" => Ok(SortOption::Category),
            other => Err(format!("unknown sort option: {other}")),
        }
    }
}

/// Sort and filter settings for the expense table. Every filter is optional
/// and all bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseListOptions {
    #[serde(default)]
    pub sort_by: SortOption,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_amount: Option<f64>,
    #[serde(default)]
    pub max_amount: Option<f64>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Total spent in one month of the monthly chart window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthTotal {
    pub month: YearMonth,
    pub total: f64,
}

/// Total spent in one category for a month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Type of calendar slot for explicit rendering logic
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CalendarDayType {
    /// Empty slot before the first day of the month
    PaddingBefore,
    /// Actual day within the month
    MonthDay,
    /// Empty slot after the last day of the month, filling the final week
    PaddingAfter,
}

/// A single slot of the calendar grid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarDay {
    /// Day of month, 0 for padding slots
    pub day: u32,
    /// Total spent on this day
    pub total: f64,
    /// Whether any expense is dated on this day, including zero-amount ones
    pub has_expense: bool,
    pub day_type: CalendarDayType,
}

/// Day-cell layout of one month, split into weeks of seven slots
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarGrid {
    pub year: i32,
    /// One-based month
    pub month: u32,
    /// Weekday of day 1, Sunday = 0
    pub first_weekday: u32,
    pub days_in_month: u32,
    pub weeks: Vec<Vec<CalendarDay>>,
    /// Total spent over the whole month
    pub month_total: f64,
}

impl CalendarGrid {
    /// Iterate over the slots that belong to the month, skipping padding
    pub fn month_days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.weeks
            .iter()
            .flatten()
            .filter(|d| d.day_type == CalendarDayType::MonthDay)
    }

    pub fn day(&self, day: u32) -> Option<&CalendarDay> {
        self.month_days().find(|d| d.day == day)
    }
}

/// An expense formatted for table display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormattedExpense {
    pub id: String,
    pub formatted_date: String,
    pub description: String,
    pub category: String,
    pub formatted_amount: String,
    pub raw_amount: f64,
    pub raw_date: NaiveDate,
}

/// Generated export file contents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportDataResponse {
    pub content: String,
    pub filename: String,
    pub expense_count: usize,
}

/// Outcome of a destructive snapshot import
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportSummary {
    pub imported_count: usize,
    pub replaced_count: usize,
}
