//! Derived views over an expense list.
//!
//! Everything here is a pure function of a list snapshot: nothing is cached
//! and the input is never mutated. Sums accumulate as `f64`; rounding to two
//! decimals happens only when amounts are formatted for display.

use chrono::NaiveDate;
use shared::{CategoryTotal, ExpenseListOptions, MonthTotal, SortOption, YearMonth};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::models::Expense;

/// Query engine computing totals, table views and chart series
#[derive(Debug, Clone, Default)]
pub struct QueryEngine;

impl QueryEngine {
    pub fn new() -> Self {
        Self
    }

    /// Sum of all amounts; zero for an empty list
    pub fn total(&self, expenses: &[Expense]) -> f64 {
        expenses.iter().map(|e| e.amount).sum()
    }

    /// Filter then sort a copy of the list for the table.
    ///
    /// The sort is stable, so entries that compare equal keep their list order.
    pub fn filtered_sorted(&self, expenses: &[Expense], options: &ExpenseListOptions) -> Vec<Expense> {
        let mut view: Vec<Expense> = expenses
            .iter()
            .filter(|e| Self::matches(e, options))
            .cloned()
            .collect();

        match options.sort_by {
            SortOption::None => {}
            SortOption::DateAsc => view.sort_by(|a, b| a.date.cmp(&b.date)),
            SortOption::DateDesc => view.sort_by(|a, b| b.date.cmp(&a.date)),
            SortOption::AmountAsc => view.sort_by(|a, b| a.amount.total_cmp(&b.amount)),
            SortOption::AmountDesc => view.sort_by(|a, b| b.amount.total_cmp(&a.amount)),
            SortOption::Category => view.sort_by(Self::by_category),
        }

        debug!(
            "Table view: {} of {} expenses, sorted {:?}",
            view.len(),
            expenses.len(),
            options.sort_by
        );
        view
    }

    fn matches(expense: &Expense, options: &ExpenseListOptions) -> bool {
        if let Some(category) = &options.category {
            if expense.effective_category() != category {
                return false;
            }
        }
        if let Some(min) = options.min_amount {
            if expense.amount < min {
                return false;
            }
        }
        if let Some(max) = options.max_amount {
            if expense.amount > max {
                return false;
            }
        }
        if let Some(start) = options.start_date {
            if expense.date < start {
                return false;
            }
        }
        if let Some(end) = options.end_date {
            if expense.date > end {
                return false;
            }
        }
        true
    }

    fn by_category(a: &Expense, b: &Expense) -> Ordering {
        a.effective_category().cmp(b.effective_category())
    }

    /// Totals for the month before `anchor`, `anchor` itself and the month
    /// after, in that order. Months without expenses total zero.
    pub fn monthly_totals(&self, expenses: &[Expense], anchor: YearMonth) -> Vec<MonthTotal> {
        [anchor.previous(), anchor, anchor.next()]
            .into_iter()
            .map(|month| MonthTotal {
                month,
                total: self.month_total(expenses, month),
            })
            .collect()
    }

    /// Per-category totals for one month, in order of first appearance.
    /// Uncategorized expenses are grouped under "Other".
    pub fn category_totals(&self, expenses: &[Expense], month: YearMonth) -> Vec<CategoryTotal> {
        let mut totals: Vec<CategoryTotal> = Vec::new();

        for expense in expenses.iter().filter(|e| e.month() == month) {
            let category = expense.effective_category();
            match totals.iter_mut().find(|t| t.category == category) {
                Some(entry) => entry.total += expense.amount,
                None => totals.push(CategoryTotal {
                    category: category.to_string(),
                    total: expense.amount,
                }),
            }
        }

        totals
    }

    /// Day-of-month to total for one month. Days without expenses are absent.
    pub fn day_totals(&self, expenses: &[Expense], month: YearMonth) -> BTreeMap<u32, f64> {
        use chrono::Datelike;

        let mut totals = BTreeMap::new();
        for expense in expenses.iter().filter(|e| e.month() == month) {
            *totals.entry(expense.date.day()).or_insert(0.0) += expense.amount;
        }
        totals
    }

    pub fn month_total(&self, expenses: &[Expense], month: YearMonth) -> f64 {
        expenses
            .iter()
            .filter(|e| e.month() == month)
            .map(|e| e.amount)
            .sum()
    }

    /// Expenses dated exactly `date`, in list order
    pub fn expenses_on(&self, expenses: &[Expense], date: NaiveDate) -> Vec<Expense> {
        expenses.iter().filter(|e| e.date == date).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use shared::ExpenseRecord;

    fn expense(description: &str, amount: f64, date: &str, category: Option<&str>) -> Expense {
        Expense::from_record(
            description.to_string(),
            &ExpenseRecord::new(description, amount, date, category),
        )
        .unwrap()
    }

    fn descriptions(expenses: &[Expense]) -> Vec<&str> {
        expenses.iter().map(|e| e.description.as_str()).collect()
    }

    fn month(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn sample() -> Vec<Expense> {
        vec![
            expense("Rent", 30.0, "2024-03-01", Some("Housing")),
            expense("Lunch", 10.0, "2024-03-15", Some("Food")),
            expense("Bus", 20.0, "2024-02-28", None),
            expense("Dinner", 20.0, "2024-03-15", Some("Food")),
        ]
    }

    #[test]
    fn test_total() {
        let engine = QueryEngine::new();
        assert_eq!(engine.total(&[]), 0.0);
        assert_eq!(engine.total(&sample()), 80.0);
    }

    #[test]
    fn test_sort_by_amount_is_stable() {
        let engine = QueryEngine::new();
        let options = ExpenseListOptions {
            sort_by: SortOption::AmountAsc,
            ..Default::default()
        };

        let view = engine.filtered_sorted(&sample(), &options);
        assert_eq!(descriptions(&view), vec!["Lunch", "Bus", "Dinner", "Rent"]);

        let options = ExpenseListOptions {
            sort_by: SortOption::AmountDesc,
            ..Default::default()
        };
        let view = engine.filtered_sorted(&sample(), &options);
        assert_eq!(descriptions(&view), vec!["Rent", "Bus", "Dinner", "Lunch"]);
    }

    #[test]
    fn test_sort_by_date() {
        let engine = QueryEngine::new();
        let asc = engine.filtered_sorted(
            &sample(),
            &ExpenseListOptions {
                sort_by: SortOption::DateAsc,
                ..Default::default()
            },
        );
        assert_eq!(descriptions(&asc), vec!["Bus", "Rent", "Lunch", "Dinner"]);

        let desc = engine.filtered_sorted(
            &sample(),
            &ExpenseListOptions {
                sort_by: SortOption::DateDesc,
                ..Default::default()
            },
        );
        assert_eq!(descriptions(&desc), vec!["Lunch", "Dinner", "Rent", "Bus"]);
    }

    #[test]
    fn test_sort_by_category_treats_missing_as_other() {
        let engine = QueryEngine::new();
        let view = engine.filtered_sorted(
            &sample(),
            &ExpenseListOptions {
                sort_by: SortOption::Category,
                ..Default::default()
            },
        );
        // Food < Housing < Other
        assert_eq!(descriptions(&view), vec!["Lunch", "Dinner", "Rent", "Bus"]);
    }

    #[test]
    fn test_default_options_keep_insertion_order() {
        let engine = QueryEngine::new();
        let view = engine.filtered_sorted(&sample(), &ExpenseListOptions::default());
        assert_eq!(descriptions(&view), vec!["Rent", "Lunch", "Bus", "Dinner"]);
    }

    #[test]
    fn test_filters_are_inclusive() {
        let engine = QueryEngine::new();
        let options = ExpenseListOptions {
            min_amount: Some(20.0),
            max_amount: Some(30.0),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 15),
            ..Default::default()
        };

        let view = engine.filtered_sorted(&sample(), &options);
        assert_eq!(descriptions(&view), vec!["Rent", "Dinner"]);
    }

    #[test]
    fn test_category_filter_matches_effective_category() {
        let engine = QueryEngine::new();
        let food = engine.filtered_sorted(
            &sample(),
            &ExpenseListOptions {
                category: Some("Food".to_string()),
                sort_by: SortOption::AmountDesc,
                ..Default::default()
            },
        );
        assert_eq!(descriptions(&food), vec!["Dinner", "Lunch"]);

        let other = engine.filtered_sorted(
            &sample(),
            &ExpenseListOptions {
                category: Some("Other".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(descriptions(&other), vec!["Bus"]);
    }

    #[test]
    fn test_filtered_sorted_does_not_touch_input() {
        let engine = QueryEngine::new();
        let list = sample();
        let _ = engine.filtered_sorted(
            &list,
            &ExpenseListOptions {
                sort_by: SortOption::AmountAsc,
                ..Default::default()
            },
        );
        assert_eq!(descriptions(&list), vec!["Rent", "Lunch", "Bus", "Dinner"]);
    }

    #[test]
    fn test_monthly_totals_window() {
        let engine = QueryEngine::new();
        let totals = engine.monthly_totals(&sample(), month(2024, 3));

        let keys: Vec<String> = totals.iter().map(|t| t.month.to_string()).collect();
        assert_eq!(keys, vec!["2024-02", "2024-03", "2024-04"]);
        assert_eq!(totals[0].total, 20.0);
        assert_eq!(totals[1].total, 60.0);
        assert_eq!(totals[2].total, 0.0);
    }

    #[test]
    fn test_monthly_totals_cross_year_boundary() {
        let engine = QueryEngine::new();
        let totals = engine.monthly_totals(&[], month(2025, 1));

        let keys: Vec<String> = totals.iter().map(|t| t.month.to_string()).collect();
        assert_eq!(keys, vec!["2024-12", "2025-01", "2025-02"]);
    }

    #[test]
    fn test_monthly_totals_at_calendar_limits() {
        let engine = QueryEngine::new();
        let last = month(NaiveDate::MAX.year(), 12);
        let first = month(NaiveDate::MIN.year(), 1);

        let totals = engine.monthly_totals(&[], last);
        assert_eq!(totals.len(), 3);
        assert_eq!(totals[1].month, last);
        assert_eq!(totals[2].month, last);

        let totals = engine.monthly_totals(&[], first);
        assert_eq!(totals[0].month, first);
        assert_eq!(totals[1].month, first);
    }

    #[test]
    fn test_category_totals_in_first_occurrence_order() {
        let engine = QueryEngine::new();
        let mut list = sample();
        list.push(expense("Parking", 5.0, "2024-03-20", Some("  ")));

        let totals = engine.category_totals(&list, month(2024, 3));
        assert_eq!(
            totals,
            vec![
                CategoryTotal { category: "Housing".to_string(), total: 30.0 },
                CategoryTotal { category: "Food".to_string(), total: 30.0 },
                CategoryTotal { category: "Other".to_string(), total: 5.0 },
            ]
        );
        assert!(engine.category_totals(&list, month(2023, 3)).is_empty());
    }

    #[test]
    fn test_day_totals_only_has_days_with_expenses() {
        let engine = QueryEngine::new();
        let totals = engine.day_totals(&sample(), month(2024, 3));

        assert_eq!(totals.len(), 2);
        assert_eq!(totals.get(&1), Some(&30.0));
        assert_eq!(totals.get(&15), Some(&30.0));
        assert_eq!(totals.get(&28), None);
    }

    #[test]
    fn test_expenses_on_day() {
        let engine = QueryEngine::new();
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let on_day = engine.expenses_on(&sample(), day);
        assert_eq!(descriptions(&on_day), vec!["Lunch", "Dinner"]);
        assert_eq!(engine.month_total(&sample(), month(2024, 2)), 20.0);
    }
}
