use comfy_table::{Cell, Table};

use crate::cli::open_store;
use crate::error::{FinflowError, Result};
use crate::fmt::money;
use crate::models::{new_id, Account, AccountType};
use crate::store::Action;
use crate::validation::{last_four, validate_balance};

pub const CARD_BRANDS: &[&str] = &["Visa", "Mastercard", "Rupay", "Amex", "Other"];

/// Match a brand against the known list, case-insensitively.
fn card_brand(input: &str) -> Result<String> {
    CARD_BRANDS
        .iter()
        .find(|b| b.eq_ignore_ascii_case(input.trim()))
        .map(|b| b.to_string())
        .ok_or_else(|| {
            FinflowError::Validation(format!(
                "brand: '{input}' is not one of: {}",
                CARD_BRANDS.join(", ")
            ))
        })
}

fn card_last4(card_number: &str) -> Result<String> {
    let last4 = last_four(card_number);
    if last4.is_empty() {
        return Err(FinflowError::Validation("card number: no digits found".to_string()));
    }
    Ok(last4)
}

pub struct NewAccount {
    pub name: String,
    pub account_type: AccountType,
    pub balance: String,
    pub currency: Option<String>,
    pub card_number: Option<String>,
    pub brand: Option<String>,
}

#[derive(Default)]
pub struct AccountEdit {
    pub name: Option<String>,
    pub account_type: Option<AccountType>,
    pub balance: Option<String>,
    pub currency: Option<String>,
    pub card_number: Option<String>,
    pub brand: Option<String>,
}

pub fn add(new: NewAccount) -> Result<()> {
    let mut store = open_store()?;
    if store.account_named(&new.name).is_some() {
        return Err(FinflowError::Validation(format!(
            "account '{}' already exists",
            new.name.trim()
        )));
    }
    let account = Account {
        id: new_id(),
        name: new.name.trim().to_string(),
        account_type: new.account_type,
        balance: validate_balance(&new.balance).into_result()?,
        currency: new
            .currency
            .unwrap_or_else(|| store.state().base_currency.clone())
            .to_uppercase(),
        card_number_last4: new.card_number.as_deref().map(card_last4).transpose()?,
        brand: new.brand.as_deref().map(card_brand).transpose()?,
    };
    let id = account.id.clone();
    store.dispatch(Action::AddAccount(account))?;
    println!("Added account: {} ({id})", new.name.trim());
    Ok(())
}

pub fn list() -> Result<()> {
    let store = open_store()?;
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Type", "Balance", "Card", "Brand"]);
    for a in &store.state().accounts {
        table.add_row(vec![
            Cell::new(&a.id),
            Cell::new(&a.name),
            Cell::new(a.account_type),
            Cell::new(money(a.balance, &a.currency)),
            Cell::new(
                a.card_number_last4
                    .as_deref()
                    .map(|l| format!("•••• {l}"))
                    .unwrap_or_default(),
            ),
            Cell::new(a.brand.as_deref().unwrap_or_default()),
        ]);
    }
    println!("Accounts\n{table}");
    println!(
        "Net worth: {}",
        money(store.net_worth(), &store.state().base_currency)
    );
    Ok(())
}

pub fn edit(id: &str, changes: AccountEdit) -> Result<()> {
    let mut store = open_store()?;
    let mut account = store
        .account(id)
        .cloned()
        .ok_or_else(|| FinflowError::NotFound(format!("account {id}")))?;
    if let Some(name) = changes.name {
        account.name = name.trim().to_string();
    }
    if let Some(kind) = changes.account_type {
        account.account_type = kind;
    }
    if let Some(balance) = changes.balance {
        account.balance = validate_balance(&balance).into_result()?;
    }
    if let Some(currency) = changes.currency {
        account.currency = currency.to_uppercase();
    }
    if let Some(card) = changes.card_number {
        account.card_number_last4 = Some(card_last4(&card)?);
    }
    if let Some(brand) = changes.brand {
        account.brand = Some(card_brand(&brand)?);
    }
    store.dispatch(Action::UpdateAccount(account))?;
    println!("Updated account {id}");
    Ok(())
}

pub fn delete(id: &str) -> Result<()> {
    let mut store = open_store()?;
    let name = store
        .account(id)
        .map(|a| a.name.clone())
        .ok_or_else(|| FinflowError::NotFound(format!("account {id}")))?;
    store.dispatch(Action::DeleteAccount(id.to_string()))?;
    println!("Deleted account: {name}");
    Ok(())
}
