pub mod accounts;
pub mod bills;
pub mod categories;
pub mod export;
pub mod init;
pub mod preferences;
pub mod report;
pub mod status;
pub mod transactions;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::error::{FinflowError, Result};
use crate::models::{AccountType, BillFrequency, BudgetPeriod, CategoryType, Theme, TransactionType};
use crate::settings::db_path;
use crate::storage::SqliteStorage;
use crate::store::Store;

pub(crate) fn open_store() -> Result<Store<SqliteStorage>> {
    Store::open(SqliteStorage::open(&db_path())?)
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| FinflowError::Validation(format!("date: expected YYYY-MM-DD, got '{value}'")))
}

/// `YYYY-MM` into (year, month).
pub(crate) fn parse_month(value: &str) -> Result<(i32, u32)> {
    let invalid = || FinflowError::Validation(format!("month: expected YYYY-MM, got '{value}'"));
    let (y, m) = value.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = y.parse().map_err(|_| invalid())?;
    let month: u32 = m.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

#[derive(Parser)]
#[command(name = "finflow", about = "Personal finance tracker: transactions, bills, budgets and reports.")]
pub struct Cli {
    /// Show development logs on stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and create the database.
    Init {
        /// Path for finflow data (default: ~/Documents/finflow)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Show the data location and headline figures.
    Status,
    /// Record a transaction.
    Add {
        /// Amount, e.g. 1250.50
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// income, expense or other
        #[arg(long = "type", default_value = "expense")]
        transaction_type: TransactionType,
        /// Category name
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "")]
        description: String,
        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Account name
        #[arg(long, default_value = "Cash")]
        account: String,
        /// Currency code (default: the base currency)
        #[arg(long)]
        currency: Option<String>,
    },
    /// List transactions, newest first.
    List {
        /// Month filter: YYYY-MM
        #[arg(long)]
        month: Option<String>,
        #[arg(long = "type")]
        transaction_type: Option<TransactionType>,
        #[arg(long)]
        category: Option<String>,
        /// Show at most this many rows
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Change fields of a transaction.
    Edit {
        /// Transaction id (shown in `finflow list`)
        id: String,
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<String>,
        #[arg(long = "type")]
        transaction_type: Option<TransactionType>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        account: Option<String>,
        #[arg(long)]
        currency: Option<String>,
    },
    /// Delete a transaction.
    Delete {
        /// Transaction id (shown in `finflow list`)
        id: String,
    },
    /// Turn a bank SMS or note into a transaction.
    ImportText {
        /// Message text, e.g. "Spent Rs. 500 on Lunch at Cafe on 25/12/2024"
        text: String,
        /// Account to record it against
        #[arg(long, default_value = "Cash")]
        account: String,
        /// Amount to use when none can be read from the text
        #[arg(long)]
        amount: Option<String>,
        /// Only show what would be imported
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// Manage categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Manage accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Manage bills.
    Bills {
        #[command(subcommand)]
        command: BillsCommands,
    },
    /// Balance, this month's income and expense, net worth.
    Summary,
    /// Expense totals by category.
    Breakdown {
        /// Only the largest N categories
        #[arg(long)]
        top: Option<usize>,
    },
    /// Income and expense over time.
    Trend {
        #[arg(long, value_enum, default_value_t = TrendPeriod::Daily)]
        period: TrendPeriod,
    },
    /// Financial statements.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Check spending in a category against a limit.
    Budget {
        /// Category name
        category: String,
        #[arg(long)]
        limit: String,
        #[arg(long, default_value = "monthly")]
        period: BudgetPeriod,
    },
    /// Write transactions or the whole state to a file.
    Export {
        #[arg(value_enum)]
        format: ExportFormat,
        /// Output file (default: <data_dir>/exports/<name>)
        #[arg(long)]
        output: Option<String>,
    },
    /// Convert an amount between currencies.
    Convert {
        #[arg(allow_hyphen_values = true)]
        amount: String,
        from: String,
        to: String,
    },
    /// Show or set the base currency.
    Currency {
        /// New base currency code
        code: Option<String>,
        /// List supported currencies and rates
        #[arg(long)]
        list: bool,
    },
    /// Show or set the display theme.
    Theme {
        theme: Option<Theme>,
    },
    /// Delete all transactions, bills and settings changes, restoring the defaults.
    Reset {
        /// Confirm that everything should be removed
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TrendPeriod {
    /// Last 30 days
    Daily,
    /// Last 6 months
    Monthly,
    /// Running balance over the last 30 transactions
    Balance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    /// Tab-separated, opens in spreadsheet apps
    Tsv,
    /// Printable HTML report
    Html,
    /// Full JSON backup
    Json,
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// List all categories.
    List,
    /// Add a category.
    Add {
        name: String,
        /// income, expense or both
        #[arg(long = "type", default_value = "expense")]
        category_type: CategoryType,
        /// Icon name, e.g. utensils, car, home
        #[arg(long, default_value = "tag")]
        icon: String,
        #[arg(long, default_value = "#64748B")]
        color: String,
    },
    /// Change a category.
    Edit {
        /// Category id (shown in `finflow categories list`)
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        category_type: Option<CategoryType>,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a category. Transactions keep its name as a label.
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// List all accounts.
    List,
    /// Add an account.
    Add {
        /// Account name, e.g. 'HDFC Savings'
        name: String,
        /// bank, cash, credit, debit or emi
        #[arg(long = "type", default_value = "bank")]
        account_type: AccountType,
        /// Opening balance (may be negative)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        balance: String,
        #[arg(long)]
        currency: Option<String>,
        /// Card number; only the last four digits are kept
        #[arg(long = "card-number")]
        card_number: Option<String>,
        /// Visa, Mastercard, Rupay, Amex or Other
        #[arg(long)]
        brand: Option<String>,
    },
    /// Change an account.
    Edit {
        /// Account id (shown in `finflow accounts list`)
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        account_type: Option<AccountType>,
        #[arg(long, allow_hyphen_values = true)]
        balance: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long = "card-number")]
        card_number: Option<String>,
        #[arg(long)]
        brand: Option<String>,
    },
    /// Delete an account. Transactions keep its name as a label.
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum BillsCommands {
    /// List bills with days until due.
    List,
    /// Add a bill.
    Add {
        name: String,
        #[arg(long)]
        amount: String,
        /// Due date: YYYY-MM-DD
        #[arg(long)]
        due: String,
        #[arg(long, default_value = "Utilities")]
        category: String,
        #[arg(long)]
        recurring: bool,
        #[arg(long, default_value = "monthly")]
        frequency: BillFrequency,
    },
    /// Mark a bill as paid (or unpaid with --undo).
    Pay {
        id: String,
        #[arg(long)]
        undo: bool,
    },
    /// Delete a bill.
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Income and expenses per category with net profit.
    Pnl,
    /// Assets, liabilities and equity.
    Balance,
    /// Income, expense and transactions of one month.
    Month {
        /// YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2025-06").unwrap(), (2025, 6));
        assert!(parse_month("2025-13").is_err());
        assert!(parse_month("June").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-06-15").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
        );
        assert!(parse_date("15/06/2025").is_err());
    }

    #[test]
    fn test_add_parses_enums() {
        let cli = Cli::parse_from(["finflow", "add", "120", "--type", "income", "--category", "Salary"]);
        match cli.command {
            Commands::Add { transaction_type, amount, .. } => {
                assert_eq!(transaction_type, TransactionType::Income);
                assert_eq!(amount, "120");
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_reset_flag_defaults_off() {
        let cli = Cli::parse_from(["finflow", "reset"]);
        assert!(matches!(cli.command, Commands::Reset { yes: false }));
    }
}
