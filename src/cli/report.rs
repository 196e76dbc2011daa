use chrono::Datelike;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_store, parse_month, ReportCommands, TrendPeriod};
use crate::error::Result;
use crate::fmt::{money, percent, signed_money};
use crate::metrics::{self, BalanceSheet, BudgetStatus, CategoryTotal, ProfitAndLoss, SeriesPoint};
use crate::models::{Budget, BudgetPeriod};
use crate::store::today;
use crate::validation::validate_amount;

const DAILY_WINDOW: u32 = 30;
const MONTHLY_WINDOW: u32 = 6;
const TREND_POINTS: usize = 30;

pub fn summary() -> Result<()> {
    let store = open_store()?;
    let currency = store.state().base_currency.as_str();
    let balance = store.total_balance();
    let balance_text = if balance >= 0.0 {
        money(balance, currency).green()
    } else {
        money(balance, currency).red()
    };
    println!("Total balance:     {balance_text}");
    println!("Income this month: {}", money(store.monthly_income(), currency));
    println!("Spent this month:  {}", money(store.monthly_expense(), currency));
    println!("Net worth:         {}", money(store.net_worth(), currency));
    println!("Transactions:      {}", store.state().transactions.len());
    Ok(())
}

pub fn format_breakdown(items: &[CategoryTotal], currency: &str) -> String {
    if items.is_empty() {
        return "No expenses recorded.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Category", "Amount", "%"]);
    for item in items {
        table.add_row(vec![
            Cell::new(&item.name),
            Cell::new(money(item.total, currency)),
            Cell::new(percent(item.percentage)),
        ]);
    }
    format!("Spending by Category\n{table}")
}

pub fn breakdown(top: Option<usize>) -> Result<()> {
    let store = open_store()?;
    let items = metrics::category_breakdown(&store.state().transactions, top);
    println!("{}", format_breakdown(&items, &store.state().base_currency));
    Ok(())
}

fn format_series(title: &str, points: &[SeriesPoint], currency: &str) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Period", "Income", "Expense", "Net"]);
    for p in points {
        table.add_row(vec![
            Cell::new(&p.label),
            Cell::new(money(p.income, currency)),
            Cell::new(money(p.expense, currency)),
            Cell::new(signed_money(p.income - p.expense, currency)),
        ]);
    }
    format!("{title}\n{table}")
}

pub fn trend(period: TrendPeriod) -> Result<()> {
    let store = open_store()?;
    let state = store.state();
    let currency = state.base_currency.as_str();
    let now = today();

    let output = match period {
        TrendPeriod::Daily => format_series(
            "Last 30 Days",
            &metrics::daily_series(&state.transactions, now, DAILY_WINDOW),
            currency,
        ),
        TrendPeriod::Monthly => format_series(
            "Last 6 Months",
            &metrics::monthly_series(&state.transactions, now, MONTHLY_WINDOW),
            currency,
        ),
        TrendPeriod::Balance => {
            let points = metrics::balance_trend(&state.transactions, TREND_POINTS);
            let mut table = Table::new();
            table.set_header(vec!["Date", "Balance"]);
            for p in &points {
                table.add_row(vec![
                    Cell::new(p.date.format("%Y-%m-%d")),
                    Cell::new(money(p.balance, currency)),
                ]);
            }
            format!("Balance Trend\n{table}")
        }
    };
    println!("{output}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

pub fn format_pnl(pnl: &ProfitAndLoss, currency: &str) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Amount"]);

    if !pnl.income.is_empty() {
        table.add_row(vec![Cell::new("INCOME".green().bold()), Cell::new("")]);
        for item in &pnl.income {
            table.add_row(vec![
                Cell::new(format!("  {}", item.name)),
                Cell::new(money(item.total, currency)),
            ]);
        }
        table.add_row(vec![
            Cell::new("Total Income".bold()),
            Cell::new(money(pnl.total_income, currency)),
        ]);
        table.add_row(vec![Cell::new(""), Cell::new("")]);
    }

    if !pnl.expenses.is_empty() {
        table.add_row(vec![Cell::new("EXPENSES".red().bold()), Cell::new("")]);
        for item in &pnl.expenses {
            table.add_row(vec![
                Cell::new(format!("  {}", item.name)),
                Cell::new(money(item.total, currency)),
            ]);
        }
        table.add_row(vec![
            Cell::new("Total Expenses".bold()),
            Cell::new(money(pnl.total_expense, currency)),
        ]);
        table.add_row(vec![Cell::new(""), Cell::new("")]);
    }

    let net_label = if pnl.net_profit >= 0.0 {
        "NET PROFIT".green().bold()
    } else {
        "NET LOSS".red().bold()
    };
    table.add_row(vec![Cell::new(net_label), Cell::new(money(pnl.net_profit, currency))]);

    format!("Profit & Loss\n{table}")
}

pub fn format_balance_sheet(sheet: &BalanceSheet, currency: &str) -> String {
    let mut table = Table::new();
    table.set_header(vec!["", "Amount"]);
    table.add_row(vec![Cell::new("ASSETS".bold()), Cell::new("")]);
    for a in &sheet.cash_accounts {
        table.add_row(vec![
            Cell::new(format!("  {} ({})", a.name, a.account_type)),
            Cell::new(money(a.balance, currency)),
        ]);
    }
    table.add_row(vec![
        Cell::new("  Net cash from transactions"),
        Cell::new(money(sheet.total_assets, currency)),
    ]);
    table.add_row(vec![Cell::new(""), Cell::new("")]);
    table.add_row(vec![Cell::new("LIABILITIES".bold()), Cell::new("")]);
    table.add_row(vec![
        Cell::new("  Unpaid bills"),
        Cell::new(money(sheet.unpaid_bills, currency)),
    ]);
    table.add_row(vec![Cell::new(""), Cell::new("")]);
    table.add_row(vec![
        Cell::new("EQUITY".bold()),
        Cell::new(money(sheet.equity, currency)),
    ]);
    format!("Balance Sheet\n{table}")
}

pub fn report(command: ReportCommands) -> Result<()> {
    let store = open_store()?;
    let state = store.state();
    let currency = state.base_currency.as_str();

    let output = match command {
        ReportCommands::Pnl => format_pnl(&metrics::profit_and_loss(&state.transactions), currency),
        ReportCommands::Balance => format_balance_sheet(&metrics::balance_sheet(state), currency),
        ReportCommands::Month { month } => {
            let (year, month) = match month.as_deref() {
                Some(m) => parse_month(m)?,
                None => {
                    let now = today();
                    (now.year(), now.month())
                }
            };
            let summary = metrics::month_summary(&state.transactions, year, month);
            let mut table = Table::new();
            table.set_header(vec!["Date", "Description", "Category", "Amount"]);
            for t in &summary.transactions {
                table.add_row(vec![
                    Cell::new(t.date.format("%Y-%m-%d")),
                    Cell::new(&t.description),
                    Cell::new(&t.category),
                    Cell::new(signed_money(t.signed_amount(), &t.currency)),
                ]);
            }
            format!(
                "Month {year}-{month:02}\nIncome:  {}\nExpense: {}\nNet:     {}\n{table}",
                money(summary.income, currency),
                money(summary.expense, currency),
                signed_money(summary.income - summary.expense, currency),
            )
        }
    };
    println!("{output}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Budgets
// ---------------------------------------------------------------------------

pub fn format_budget(status: &BudgetStatus, currency: &str) -> String {
    let flag = if status.is_over_budget {
        "OVER BUDGET".red().bold().to_string()
    } else if status.is_near_limit {
        "near limit".yellow().to_string()
    } else {
        "on track".green().to_string()
    };
    format!(
        "{} budget ({}): {} of {} spent, {} ({flag})\nRemaining: {}",
        status.budget.category,
        status.budget.period,
        money(status.spent, currency),
        money(status.budget.limit, currency),
        percent(status.percentage),
        money(status.remaining, currency),
    )
}

pub fn budget(category: &str, limit: &str, period: BudgetPeriod) -> Result<()> {
    let store = open_store()?;
    let name = store
        .category_named(category)
        .map_or_else(|| category.trim().to_string(), |c| c.name.clone());
    let budget = Budget {
        category: name,
        limit: validate_amount(limit).into_result()?,
        period,
    };
    let status = metrics::budget_status(&budget, &store.state().transactions, today());
    println!("{}", format_budget(&status, &store.state().base_currency));
    Ok(())
}
