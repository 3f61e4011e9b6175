//! Calendar domain logic for the expense tracker.
//!
//! This module lays out a month as a grid of seven-day weeks annotated with
//! what was spent each day, and keeps the month cursors the calendar and chart
//! views navigate with. The UI only draws the grid it is given.

use chrono::{Datelike, Local};
use shared::{CalendarDay, CalendarDayType, CalendarGrid, YearMonth};
use std::collections::HashSet;
use tracing::debug;

use crate::domain::error::{ExpenseError, ExpenseResult};
use crate::domain::models::Expense;
use crate::domain::query::QueryEngine;

/// Calendar service that builds month grids from an expense list
#[derive(Debug, Clone, Default)]
pub struct CalendarService {
    query_engine: QueryEngine,
}

impl CalendarService {
    /// Create a new CalendarService instance
    pub fn new() -> Self {
        Self {
            query_engine: QueryEngine::new(),
        }
    }

    /// Lay out `month` (one-based) of `year` as weeks starting on Sunday.
    ///
    /// Leading slots before day 1 are `PaddingBefore`, and the last week is
    /// filled up to seven slots with `PaddingAfter`.
    pub fn layout(&self, expenses: &[Expense], year: i32, month: u32) -> ExpenseResult<CalendarGrid> {
        let target = target_month(year, month)?;

        let first_weekday = target.first_weekday();
        let days_in_month = target.days_in_month();
        let day_totals = self.query_engine.day_totals(expenses, target);
        let days_with_expenses: HashSet<u32> = expenses
            .iter()
            .filter(|e| e.month() == target)
            .map(|e| e.date.day())
            .collect();

        debug!(
            "🗓️ CALENDAR: Laying out {} (starts on weekday {}, {} days)",
            target, first_weekday, days_in_month
        );

        let mut weeks = Vec::new();
        let mut week: Vec<CalendarDay> = (0..first_weekday)
            .map(|_| Self::padding(CalendarDayType::PaddingBefore))
            .collect();

        for day in 1..=days_in_month {
            week.push(CalendarDay {
                day,
                total: day_totals.get(&day).copied().unwrap_or(0.0),
                has_expense: days_with_expenses.contains(&day),
                day_type: CalendarDayType::MonthDay,
            });

            if (first_weekday + day) % 7 == 0 || day == days_in_month {
                while week.len() < 7 {
                    week.push(Self::padding(CalendarDayType::PaddingAfter));
                }
                weeks.push(std::mem::take(&mut week));
            }
        }

        Ok(CalendarGrid {
            year,
            month,
            first_weekday,
            days_in_month,
            weeks,
            month_total: self.query_engine.month_total(expenses, target),
        })
    }

    /// Total spent in `month` (one-based) of `year`
    pub fn monthly_total(&self, expenses: &[Expense], year: i32, month: u32) -> ExpenseResult<f64> {
        let target = target_month(year, month)?;
        Ok(self.query_engine.month_total(expenses, target))
    }

    fn padding(day_type: CalendarDayType) -> CalendarDay {
        CalendarDay {
            day: 0,
            total: 0.0,
            has_expense: false,
            day_type,
        }
    }
}

fn target_month(year: i32, month: u32) -> ExpenseResult<YearMonth> {
    if !(1..=12).contains(&month) {
        return Err(ExpenseError::InvalidMonth(month));
    }
    YearMonth::new(year, month).ok_or(ExpenseError::InvalidYear(year))
}

/// The month a view is currently showing.
///
/// The calendar and the monthly chart each own one, so moving one view does
/// not move the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    current: YearMonth,
}

impl MonthCursor {
    pub fn new(start: YearMonth) -> Self {
        Self { current: start }
    }

    /// Cursor on the month containing today's local date
    pub fn current_month() -> Self {
        Self::new(YearMonth::from_date(Local::now().date_naive()))
    }

    pub fn current(&self) -> YearMonth {
        self.current
    }

    pub fn set(&mut self, month: YearMonth) {
        self.current = month;
    }

    /// Move forward one month and return the new position
    pub fn next(&mut self) -> YearMonth {
        self.current = self.current.next();
        self.current
    }

    /// Move back one month and return the new position
    pub fn previous(&mut self) -> YearMonth {
        self.current = self.current.previous();
        self.current
    }

    /// Move by a signed number of months
    pub fn shift(&mut self, months: i32) -> YearMonth {
        for _ in 0..months.unsigned_abs() {
            if months > 0 {
                self.next();
            } else {
                self.previous();
            }
        }
        self.current
    }
}

impl Default for MonthCursor {
    fn default() -> Self {
        Self::current_month()
    }
}
