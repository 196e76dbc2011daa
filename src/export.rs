use std::io::Write;

use chrono::NaiveDate;

use crate::error::Result;
use crate::fmt::{money, percent};
use crate::metrics::category_breakdown;
use crate::models::{FinanceState, Transaction, TransactionType};

pub const EXPORT_HEADER: [&str; 7] =
    ["Date", "Description", "Category", "Account", "Type", "Amount", "Currency"];

pub const CSV_FILE_NAME: &str = "finflow-transactions.csv";
pub const TSV_FILE_NAME: &str = "finflow-transactions.xls";
pub const REPORT_FILE_NAME: &str = "finflow-report.html";
pub const BACKUP_FILE_NAME: &str = "finflow-backup.json";

/// How many transactions the printable report lists.
pub const REPORT_RECENT_LIMIT: usize = 50;

// ---------------------------------------------------------------------------
// Delimited exports
// ---------------------------------------------------------------------------

fn write_delimited<W: Write>(transactions: &[Transaction], writer: W, delimiter: u8) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    out.write_record(EXPORT_HEADER)?;
    for t in transactions {
        let signed = match t.transaction_type {
            TransactionType::Expense if t.amount > 0.0 => -t.amount,
            _ => t.amount,
        };
        out.write_record([
            t.date.format("%Y-%m-%d").to_string(),
            t.description.clone(),
            t.category.clone(),
            t.account.clone(),
            t.transaction_type.to_string(),
            signed.to_string(),
            t.currency.clone(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// Comma-separated rows with signed amounts (expenses negative).
pub fn write_csv<W: Write>(transactions: &[Transaction], writer: W) -> Result<()> {
    write_delimited(transactions, writer, b',')
}

/// Tab-separated rows that spreadsheet apps open directly.
pub fn write_tsv<W: Write>(transactions: &[Transaction], writer: W) -> Result<()> {
    write_delimited(transactions, writer, b'\t')
}

pub fn to_csv(transactions: &[Transaction]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(transactions, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn to_tsv(transactions: &[Transaction]) -> Result<String> {
    let mut buf = Vec::new();
    write_tsv(transactions, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

// ---------------------------------------------------------------------------
// Printable HTML report
// ---------------------------------------------------------------------------

pub fn escape_html(unsafe_text: &str) -> String {
    let mut out = String::with_capacity(unsafe_text.len());
    for c in unsafe_text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

const REPORT_STYLE: &str = "
    body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; padding: 40px; max-width: 800px; margin: 0 auto; }
    h1 { color: #0d9488; border-bottom: 2px solid #0d9488; padding-bottom: 10px; }
    h2 { color: #334155; margin-top: 30px; }
    .summary { display: grid; grid-template-columns: repeat(3, 1fr); gap: 20px; margin: 20px 0; }
    .summary-card { padding: 20px; border-radius: 12px; text-align: center; }
    .income { background: #dcfce7; color: #166534; }
    .expense { background: #fee2e2; color: #991b1b; }
    .balance { background: #e0f2fe; color: #0369a1; }
    table { width: 100%; border-collapse: collapse; margin-top: 20px; }
    th, td { padding: 12px; text-align: left; border-bottom: 1px solid #e2e8f0; }
    th { background: #f8fafc; font-weight: 600; }
    .credit { color: #16a34a; }
    .debit { color: #dc2626; }
    .footer { margin-top: 40px; text-align: center; color: #64748b; font-size: 12px; }
";

/// Self-contained HTML summary meant to be opened in a browser and printed.
/// Every piece of user-entered text is escaped.
pub fn html_report(state: &FinanceState, generated_on: NaiveDate) -> String {
    let currency = state.base_currency.as_str();
    let sum = |kind: TransactionType| -> f64 {
        state
            .transactions
            .iter()
            .filter(|t| t.transaction_type == kind)
            .map(|t| t.amount)
            .sum()
    };
    let total_income = sum(TransactionType::Income);
    let total_expense = sum(TransactionType::Expense);

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("  <meta charset=\"utf-8\">\n  <title>FinFlow Financial Report</title>\n");
    html.push_str(&format!("  <style>{REPORT_STYLE}  </style>\n</head>\n<body>\n"));
    html.push_str("  <h1>FinFlow Financial Report</h1>\n");
    html.push_str(&format!(
        "  <p style=\"color: #64748b;\">Generated on {}</p>\n",
        generated_on.format("%B %-d, %Y")
    ));

    html.push_str("  <div class=\"summary\">\n");
    for (class, title, value) in [
        ("income", "Total Income", total_income),
        ("expense", "Total Expenses", total_expense),
        ("balance", "Net Balance", total_income - total_expense),
    ] {
        html.push_str(&format!(
            "    <div class=\"summary-card {class}\"><h3>{title}</h3><p>{}</p></div>\n",
            escape_html(&money(value, currency))
        ));
    }
    html.push_str("  </div>\n");

    html.push_str("  <h2>Category Breakdown</h2>\n  <table>\n");
    html.push_str("    <thead><tr><th>Category</th><th>Amount</th><th>% of Total</th></tr></thead>\n");
    html.push_str("    <tbody>\n");
    for item in category_breakdown(&state.transactions, None) {
        html.push_str(&format!(
            "      <tr><td>{}</td><td class=\"debit\">{}</td><td>{}</td></tr>\n",
            escape_html(&item.name),
            escape_html(&money(item.total, currency)),
            percent(item.percentage)
        ));
    }
    html.push_str("    </tbody>\n  </table>\n");

    html.push_str("  <h2>Recent Transactions</h2>\n  <table>\n");
    html.push_str(
        "    <thead><tr><th>Date</th><th>Description</th><th>Category</th><th>Amount</th></tr></thead>\n",
    );
    html.push_str("    <tbody>\n");
    for t in state.transactions.iter().take(REPORT_RECENT_LIMIT) {
        let (class, sign) = match t.transaction_type {
            TransactionType::Income => ("credit", "+"),
            _ => ("debit", "-"),
        };
        html.push_str(&format!(
            "      <tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{class}\">{sign}{}</td></tr>\n",
            t.date.format("%b %-d, %Y"),
            escape_html(&t.description),
            escape_html(&t.category),
            escape_html(&money(t.amount, &t.currency))
        ));
    }
    html.push_str("    </tbody>\n  </table>\n");

    html.push_str("  <div class=\"footer\"><p>FinFlow - Personal Finance Management</p></div>\n");
    html.push_str("</body>\n</html>\n");
    html
}

// ---------------------------------------------------------------------------
// Backup
// ---------------------------------------------------------------------------

/// Pretty-printed copy of the whole state. Accounts only ever carry the last
/// four card digits, so the backup is safe to share.
pub fn backup_json(state: &FinanceState) -> Result<String> {
    Ok(serde_json::to_string_pretty(state)?)
}
