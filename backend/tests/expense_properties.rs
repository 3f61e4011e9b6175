//! End-to-end behaviour of the store, queries and calendar over real files.

use chrono::{Datelike, NaiveDate};
use expense_tracker_backend::domain::{CalendarService, ExpenseStore, QueryEngine};
use expense_tracker_backend::storage::{Connection, ExpenseStorage, JsonConnection, MemoryStorage};
use expense_tracker_backend::ExpenseError;
use shared::{ExpenseListOptions, ExpenseRecord, SortOption, YearMonth};
use tempfile::TempDir;

fn record(description: &str, amount: f64, date: &str, category: Option<&str>) -> ExpenseRecord {
    ExpenseRecord::new(description, amount, date, category)
}

fn descriptions<S: ExpenseStorage>(store: &ExpenseStore<S>) -> Vec<String> {
    store.expenses().iter().map(|e| e.description.clone()).collect()
}

#[test]
fn added_record_is_last_after_reload() {
    let temp_dir = TempDir::new().unwrap();
    let connection = JsonConnection::new(temp_dir.path()).unwrap();

    let mut store = ExpenseStore::open(connection.create_expense_repository("expenses"));
    store.add(&record("First", 1.0, "2024-03-01", None)).unwrap();
    let added = record("Groceries", 42.5, "2024-03-02", Some("Food"));
    store.add(&added).unwrap();

    let reopened = ExpenseStore::open(connection.create_expense_repository("expenses"));
    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened.get(reopened.len() - 1).unwrap(), added);
}

#[test]
fn removing_index_zero_twice_removes_both_records() {
    let mut store = ExpenseStore::open(MemoryStorage::new("expenses"));
    store.add(&record("A", 1.0, "2024-03-01", None)).unwrap();
    store.add(&record("B", 2.0, "2024-03-01", None)).unwrap();

    let first = store.remove(0).unwrap();
    let second = store.remove(0).unwrap();

    assert_eq!(first.description, "A");
    assert_eq!(second.description, "B");
    assert!(store.is_empty());
}

#[test]
fn duplicates_are_independent_entries() {
    let mut store = ExpenseStore::open(MemoryStorage::new("expenses"));
    let same = record("Coffee", 3.0, "2024-03-01", None);
    let first = store.add(&same).unwrap();
    let second = store.add(&same).unwrap();

    assert_ne!(first, second);
    store.remove_by_id(&first).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.expenses()[0].id, second);
}

#[test]
fn total_is_order_independent() {
    let engine = QueryEngine::new();
    let mut store = ExpenseStore::open(MemoryStorage::new("expenses"));
    store.add(&record("A", 0.1, "2024-03-03", None)).unwrap();
    store.add(&record("B", 0.2, "2024-03-01", None)).unwrap();
    store.add(&record("C", 0.3, "2024-03-02", None)).unwrap();

    assert_eq!(engine.total(&[]), 0.0);

    let asc = engine.filtered_sorted(
        store.expenses(),
        &ExpenseListOptions {
            sort_by: SortOption::DateAsc,
            ..Default::default()
        },
    );
    let desc = engine.filtered_sorted(
        store.expenses(),
        &ExpenseListOptions {
            sort_by: SortOption::DateDesc,
            ..Default::default()
        },
    );

    let total = engine.total(store.expenses());
    assert!((engine.total(&asc) - total).abs() < 1e-9);
    assert!((engine.total(&desc) - total).abs() < 1e-9);
}

#[test]
fn amount_sort_and_category_filter() {
    let engine = QueryEngine::new();
    let mut store = ExpenseStore::open(MemoryStorage::new("expenses"));
    store.add(&record("Thirty", 30.0, "2024-03-01", Some("Food"))).unwrap();
    store.add(&record("Ten", 10.0, "2024-03-02", Some("Travel"))).unwrap();
    store.add(&record("Twenty", 20.0, "2024-03-03", Some("Food"))).unwrap();

    let sorted = engine.filtered_sorted(
        store.expenses(),
        &ExpenseListOptions {
            sort_by: SortOption::AmountAsc,
            ..Default::default()
        },
    );
    let amounts: Vec<f64> = sorted.iter().map(|e| e.amount).collect();
    assert_eq!(amounts, vec![10.0, 20.0, 30.0]);

    let food = engine.filtered_sorted(
        store.expenses(),
        &ExpenseListOptions {
            sort_by: SortOption::AmountAsc,
            category: Some("Food".to_string()),
            ..Default::default()
        },
    );
    let names: Vec<&str> = food.iter().map(|e| e.description.as_str()).collect();
    assert_eq!(names, vec!["Twenty", "Thirty"]);
}

#[test]
fn monthly_window_and_uncategorized_bucket() {
    let engine = QueryEngine::new();
    let mut store = ExpenseStore::open(MemoryStorage::new("expenses"));
    store.add(&record("Bus", 2.5, "2024-03-10", None)).unwrap();

    let march = YearMonth::new(2024, 3).unwrap();
    let keys: Vec<String> = engine
        .monthly_totals(store.expenses(), march)
        .iter()
        .map(|t| t.month.to_string())
        .collect();
    assert_eq!(keys, vec!["2024-02", "2024-03", "2024-04"]);

    let categories = engine.category_totals(store.expenses(), march);
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].category, "Other");
    assert_eq!(categories[0].total, 2.5);
}

#[test]
fn february_layout_follows_leap_years() {
    let calendar = CalendarService::new();

    assert_eq!(calendar.layout(&[], 2024, 2).unwrap().days_in_month, 29);
    assert_eq!(calendar.layout(&[], 2023, 2).unwrap().days_in_month, 28);
}

#[test]
fn export_then_import_restores_identical_list() {
    let temp_dir = TempDir::new().unwrap();
    let connection = JsonConnection::new(temp_dir.path()).unwrap();
    let mut store = ExpenseStore::open(connection.create_expense_repository("expenses"));
    store.add(&record("Rent", 800.0, "2024-03-01", Some("Housing"))).unwrap();
    store.add(&record("Sample", 0.0, "2024-03-02", None)).unwrap();
    let before = store.snapshot();

    let blob = store.export_snapshot().unwrap();
    store.remove(0).unwrap();
    store.import_snapshot(&blob).unwrap();

    assert_eq!(store.snapshot(), before);
    let reopened = ExpenseStore::open(connection.create_expense_repository("expenses"));
    assert_eq!(reopened.snapshot(), before);
}

#[test]
fn importing_an_object_is_rejected_and_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let connection = JsonConnection::new(temp_dir.path()).unwrap();
    let mut store = ExpenseStore::open(connection.create_expense_repository("expenses"));
    store.add(&record("Keep me", 5.0, "2024-03-01", None)).unwrap();

    let result = store.import_snapshot(r#"{"description":"Bus","amount":2,"date":"2024-03-01"}"#);

    assert!(matches!(result, Err(ExpenseError::Format(_))));
    assert_eq!(descriptions(&store), vec!["Keep me"]);
    let reopened = ExpenseStore::open(connection.create_expense_repository("expenses"));
    assert_eq!(descriptions(&reopened), vec!["Keep me"]);
}

#[test]
fn corrupt_slot_loads_as_empty() {
    let temp_dir = TempDir::new().unwrap();
    let connection = JsonConnection::new(temp_dir.path()).unwrap();
    std::fs::write(connection.slot_file_path("expenses"), "not json at all").unwrap();

    let store = ExpenseStore::open(connection.create_expense_repository("expenses"));
    assert!(store.is_empty());
}

#[test]
fn amounts_survive_restart_bit_for_bit() {
    let temp_dir = TempDir::new().unwrap();
    let connection = JsonConnection::new(temp_dir.path()).unwrap();
    let mut store = ExpenseStore::open(connection.create_expense_repository("expenses"));
    let amounts = [46542.406843112396, 0.1 + 0.2, 13.99 * 3.0];
    for amount in amounts {
        store.add(&record("Split bill", amount, "2024-03-01", None)).unwrap();
    }

    let reopened = ExpenseStore::open(connection.create_expense_repository("expenses"));
    let stored: Vec<u64> = reopened.expenses().iter().map(|e| e.amount.to_bits()).collect();
    let expected: Vec<u64> = amounts.iter().map(|a| a.to_bits()).collect();
    assert_eq!(stored, expected);
}

#[test]
fn calendar_rejects_years_outside_the_calendar() {
    let calendar = CalendarService::new();

    assert_eq!(
        calendar.layout(&[], 300_000, 1).unwrap_err(),
        ExpenseError::InvalidYear(300_000)
    );
    let last = YearMonth::new(NaiveDate::MAX.year(), 12).unwrap();
    assert_eq!(QueryEngine::new().monthly_totals(&[], last).len(), 3);
}
