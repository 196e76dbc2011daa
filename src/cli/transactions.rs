use chrono::Datelike;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_store, parse_date, parse_month};
use crate::error::{FinflowError, Result};
use crate::fmt::{money, signed_money};
use crate::models::{new_id, Transaction, TransactionType};
use crate::parser::TextImporter;
use crate::storage::Storage;
use crate::store::{today, Action, Store};
use crate::validation::validate_amount;

pub struct NewTransaction {
    pub amount: String,
    pub transaction_type: TransactionType,
    pub category: String,
    pub description: String,
    pub date: Option<String>,
    pub account: String,
    pub currency: Option<String>,
}

#[derive(Default)]
pub struct TransactionEdit {
    pub amount: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub account: Option<String>,
    pub currency: Option<String>,
}

/// Warn (but do not refuse) when the category is unknown or meant for the
/// other direction; the name is stored as a label either way.
fn warn_on_category<S: Storage>(store: &Store<S>, category: &str, kind: TransactionType) {
    match store.category_named(category) {
        None => eprintln!("{}", format!("Note: '{category}' is not a known category").yellow()),
        Some(c) if !c.category_type.allows(kind) => eprintln!(
            "{}",
            format!("Note: '{}' is a {} category", c.name, c.category_type).yellow()
        ),
        Some(_) => {}
    }
}

/// Use the stored spelling of a known category/account name.
fn canonical_category<S: Storage>(store: &Store<S>, name: &str) -> String {
    store
        .category_named(name)
        .map_or_else(|| name.trim().to_string(), |c| c.name.clone())
}

fn canonical_account<S: Storage>(store: &Store<S>, name: &str) -> String {
    store
        .account_named(name)
        .map_or_else(|| name.trim().to_string(), |a| a.name.clone())
}

pub fn add(new: NewTransaction) -> Result<()> {
    let mut store = open_store()?;
    let amount = validate_amount(&new.amount).into_result()?;
    let date = match new.date.as_deref() {
        Some(d) => parse_date(d)?,
        None => today(),
    };
    warn_on_category(&store, &new.category, new.transaction_type);

    let transaction = Transaction {
        id: new_id(),
        amount,
        description: new.description.trim().to_string(),
        date,
        transaction_type: new.transaction_type,
        category: canonical_category(&store, &new.category),
        account: canonical_account(&store, &new.account),
        currency: new
            .currency
            .unwrap_or_else(|| store.state().base_currency.clone())
            .to_uppercase(),
    };
    let id = transaction.id.clone();
    let line = format!(
        "{} {} in {}",
        transaction.transaction_type,
        signed_money(transaction.signed_amount(), &transaction.currency),
        transaction.category
    );
    store.dispatch(Action::AddTransaction(transaction))?;
    println!("Added {line} ({id})");
    Ok(())
}

pub fn list(
    month: Option<String>,
    transaction_type: Option<TransactionType>,
    category: Option<String>,
    limit: Option<usize>,
) -> Result<()> {
    let store = open_store()?;
    let period = month.as_deref().map(parse_month).transpose()?;

    let mut rows: Vec<&Transaction> = store
        .state()
        .transactions
        .iter()
        .filter(|t| period.map_or(true, |(y, m)| t.date.year() == y && t.date.month() == m))
        .filter(|t| transaction_type.map_or(true, |k| t.transaction_type == k))
        .filter(|t| {
            category
                .as_deref()
                .map_or(true, |c| t.category.eq_ignore_ascii_case(c))
        })
        .collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    if let Some(n) = limit {
        rows.truncate(n);
    }

    if rows.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Description", "Category", "Account", "Amount"]);
    for t in &rows {
        let amount = signed_money(t.signed_amount(), &t.currency);
        let amount = match t.transaction_type {
            TransactionType::Income => amount.green(),
            TransactionType::Expense => amount.red(),
            TransactionType::Other => amount.normal(),
        };
        table.add_row(vec![
            Cell::new(&t.id),
            Cell::new(t.date.format("%Y-%m-%d")),
            Cell::new(&t.description),
            Cell::new(&t.category),
            Cell::new(&t.account),
            Cell::new(amount),
        ]);
    }
    println!("Transactions\n{table}");
    Ok(())
}

pub fn edit(id: &str, changes: TransactionEdit) -> Result<()> {
    let mut store = open_store()?;
    let mut t = store
        .transaction(id)
        .cloned()
        .ok_or_else(|| FinflowError::NotFound(format!("transaction {id}")))?;

    if let Some(amount) = changes.amount {
        t.amount = validate_amount(&amount).into_result()?;
    }
    if let Some(kind) = changes.transaction_type {
        t.transaction_type = kind;
    }
    if let Some(category) = changes.category {
        t.category = canonical_category(&store, &category);
    }
    if let Some(description) = changes.description {
        t.description = description.trim().to_string();
    }
    if let Some(date) = changes.date {
        t.date = parse_date(&date)?;
    }
    if let Some(account) = changes.account {
        t.account = canonical_account(&store, &account);
    }
    if let Some(currency) = changes.currency {
        t.currency = currency.to_uppercase();
    }
    warn_on_category(&store, &t.category, t.transaction_type);

    store.dispatch(Action::UpdateTransaction(t))?;
    println!("Updated transaction {id}");
    Ok(())
}

pub fn delete(id: &str) -> Result<()> {
    let mut store = open_store()?;
    if store.transaction(id).is_none() {
        return Err(FinflowError::NotFound(format!("transaction {id}")));
    }
    store.dispatch(Action::DeleteTransaction(id.to_string()))?;
    println!("Deleted transaction {id}");
    Ok(())
}

pub fn import_text(text: &str, account: &str, amount: Option<String>, dry_run: bool) -> Result<()> {
    let mut store = open_store()?;
    let mut importer = TextImporter::new()?;
    let mut parsed = importer.parse(text, today())?;

    if let Some(manual) = amount {
        parsed.amount = Some(validate_amount(&manual).into_result()?);
    }

    let currency = store.state().base_currency.clone();
    let amount_label = parsed
        .amount
        .map_or_else(|| "(not found)".yellow().to_string(), |a| money(a, &currency));
    println!("Amount:       {amount_label}");
    println!("Type:         {}", parsed.transaction_type);
    println!("Category:     {}", parsed.category);
    println!("Date:         {}", parsed.date.format("%Y-%m-%d"));
    println!("Description:  {}", parsed.description);

    if dry_run {
        return Ok(());
    }
    let transaction = parsed.into_transaction(&canonical_account(&store, account), &currency)?;
    let id = transaction.id.clone();
    store.dispatch(Action::AddTransaction(transaction))?;
    println!("Imported as {id}");
    Ok(())
}
