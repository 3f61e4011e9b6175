use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use shared::{CalendarDayType, CalendarGrid, ExpenseListOptions, FormattedExpense, SortOption, YearMonth};
use tracing::info;
use tracing_subscriber::EnvFilter;

use expense_tracker_backend::config::DATA_DIR_ENV;
use expense_tracker_backend::{Backend, Config, ExpenseError};

#[derive(Parser, Debug)]
#[command(name = "expense-tracker")]
#[command(about = "Log expenses and look at where the money went")]
struct Cli {
    /// Directory holding the expense data (also read from `EXPENSE_TRACKER_DATA_DIR`).
    #[arg(long, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Log filter, e.g. `debug` (defaults to the configured level; `RUST_LOG` wins).
    #[arg(long)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add an expense
    Add(ExpenseFields),
    /// Replace the expense at a table position
    Edit {
        index: usize,
        #[command(flatten)]
        fields: ExpenseFields,
    },
    /// Remove the expense at a table position
    Remove { index: usize },
    /// Show the expense table
    List(ListArgs),
    /// Show the total of every expense
    Total,
    /// Show the three-month spending window
    Months(MonthArgs),
    /// Show spending per category for a month
    Categories(MonthArgs),
    /// Show the calendar for a month
    Calendar(MonthArgs),
    /// Show the expenses of one day
    Day { date: NaiveDate },
    /// Write a JSON backup
    Export {
        /// Directory to write into (defaults to the backup directory)
        #[arg(long)]
        to: Option<String>,
    },
    /// Replace all expenses with a JSON backup
    Import { file: PathBuf },
    /// Write a CSV sheet
    ExportCsv {
        #[arg(long)]
        to: Option<String>,
    },
}

#[derive(Args, Debug)]
struct ExpenseFields {
    #[arg(long)]
    description: String,
    #[arg(long)]
    amount: String,
    /// Date as YYYY-MM-DD (defaults to today)
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    category: Option<String>,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// none, date-asc, date-desc, amount-asc, amount-desc or category
    #[arg(long, default_value = "none")]
    sort: SortOption,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    min: Option<f64>,
    #[arg(long)]
    max: Option<f64>,
    #[arg(long)]
    from: Option<NaiveDate>,
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(Args, Debug)]
struct MonthArgs {
    /// Month as YYYY-MM (defaults to the current month)
    #[arg(long)]
    month: Option<YearMonth>,
    /// Months to step forward from there
    #[arg(long, default_value_t = 0)]
    next: u32,
    /// Months to step back from there
    #[arg(long, default_value_t = 0)]
    prev: u32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.data_dir.clone())?;
    if let Some(level) = cli.log.clone() {
        config.log_level = level;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Using data directory {}", config.data_directory.display());
    let mut backend = Backend::new(config)?;
    let today = Local::now().date_naive();

    match cli.command {
        Command::Add(fields) => {
            let date = fields.date.unwrap_or_else(|| today.to_string());
            let id = report(backend.submit(
                &fields.description,
                &fields.amount,
                &date,
                fields.category.as_deref(),
                None,
            ), &backend)?;
            println!("Added expense {}", id);
        }
        Command::Edit { index, fields } => {
            let date = match fields.date {
                Some(date) => date,
                None => report(backend.edit_request(index), &backend)?.date,
            };
            report(backend.submit(
                &fields.description,
                &fields.amount,
                &date,
                fields.category.as_deref(),
                Some(index),
            ), &backend)?;
            println!("Updated expense {}", index);
        }
        Command::Remove { index } => {
            let removed = report(backend.delete_request(index), &backend)?;
            println!("Removed '{}'", removed.description);
        }
        Command::List(args) => {
            let options = ExpenseListOptions {
                sort_by: args.sort,
                category: args.category,
                min_amount: args.min,
                max_amount: args.max,
                start_date: args.from,
                end_date: args.to,
            };
            print_table(&backend.table(&options));
        }
        Command::Total => {
            println!("{}", backend.expense_table_service.format_amount(backend.total()));
        }
        Command::Months(args) => {
            backend.chart_cursor.set(args.resolve(today));
            for month in backend.monthly_chart() {
                println!(
                    "{}  {:>12}",
                    month.month,
                    backend.expense_table_service.format_amount(month.total)
                );
            }
        }
        Command::Categories(args) => {
            backend.chart_cursor.set(args.resolve(today));
            for category in backend.category_chart() {
                println!(
                    "{:<20} {:>12}",
                    category.category,
                    backend.expense_table_service.format_amount(category.total)
                );
            }
        }
        Command::Calendar(args) => {
            backend.calendar_cursor.set(args.resolve(today));
            let grid = report(backend.calendar(), &backend)?;
            print_calendar(&grid, &backend);
        }
        Command::Day { date } => {
            print_table(&backend.day_detail(date));
        }
        Command::Export { to } => {
            let path = backend.export_backup_to(to.as_deref(), today)?;
            println!("Backup written to {}", path.display());
        }
        Command::Import { file } => {
            let summary = backend.import_backup_from(&file)?;
            println!(
                "Imported {} expenses (replaced {})",
                summary.imported_count, summary.replaced_count
            );
        }
        Command::ExportCsv { to } => {
            let path = backend.export_csv_to(to.as_deref(), today)?;
            println!("CSV written to {}", path.display());
        }
    }

    Ok(())
}

impl MonthArgs {
    fn resolve(&self, today: NaiveDate) -> YearMonth {
        let mut month = self.month.unwrap_or_else(|| YearMonth::from_date(today));
        for _ in 0..self.next {
            month = month.next();
        }
        for _ in 0..self.prev {
            month = month.previous();
        }
        month
    }
}

/// Print validation failures one per line before passing the error up
fn report<T>(result: Result<T, ExpenseError>, backend: &Backend) -> Result<T> {
    if let Err(ExpenseError::Validation(errors)) = &result {
        for message in backend.expense_table_service.validation_error_messages(errors) {
            eprintln!("  - {}", message);
        }
    }
    result.map_err(anyhow::Error::from)
}

fn print_table(rows: &[FormattedExpense]) {
    if rows.is_empty() {
        println!("No expenses");
        return;
    }
    for (position, row) in rows.iter().enumerate() {
        println!(
            "{:>3}  {}  {:<30} {:<15} {:>12}",
            position, row.formatted_date, row.description, row.category, row.formatted_amount
        );
    }
}

fn print_calendar(grid: &CalendarGrid, backend: &Backend) {
    if let Some(month) = YearMonth::new(grid.year, grid.month) {
        println!("{} {}", month.month_name(), grid.year);
    }
    println!(" Sun  Mon  Tue  Wed  Thu  Fri  Sat");
    for week in &grid.weeks {
        let line: Vec<String> = week
            .iter()
            .map(|slot| match slot.day_type {
                CalendarDayType::MonthDay if slot.has_expense => format!("{:>3}*", slot.day),
                CalendarDayType::MonthDay => format!("{:>3} ", slot.day),
                _ => "    ".to_string(),
            })
            .collect();
        println!("{}", line.join(" "));
    }
    println!(
        "Month total: {}",
        backend.expense_table_service.format_amount(grid.month_total)
    );
}
