use comfy_table::{Cell, Table};

use crate::cli::open_store;
use crate::currency::{self, CURRENCIES};
use crate::error::{FinflowError, Result};
use crate::fmt::money;
use crate::models::Theme;
use crate::store::Action;
use crate::validation::validate_amount;

pub fn convert(amount: &str, from: &str, to: &str) -> Result<()> {
    let value = validate_amount(amount).into_result()?;
    let converted = currency::convert(value, from, to)?;
    println!("{} = {}", money(value, from), money(converted, to));
    Ok(())
}

fn rate_table() -> String {
    let mut table = Table::new();
    table.set_header(vec!["Code", "Name", "Symbol", "Per 1 INR"]);
    for c in CURRENCIES {
        table.add_row(vec![
            Cell::new(c.code),
            Cell::new(c.name),
            Cell::new(c.symbol),
            Cell::new(c.rate),
        ]);
    }
    format!("Currencies (static rates)\n{table}")
}

pub fn currency(code: Option<String>, list: bool) -> Result<()> {
    if list {
        println!("{}", rate_table());
    }
    let mut store = open_store()?;
    match code {
        Some(code) => {
            let info = currency::lookup(&code)?;
            store.dispatch(Action::SetBaseCurrency(info.code.to_string()))?;
            println!("Base currency set to {} ({})", info.code, info.name);
        }
        None if !list => println!("Base currency: {}", store.state().base_currency),
        None => {}
    }
    Ok(())
}

pub fn theme(theme: Option<Theme>) -> Result<()> {
    let mut store = open_store()?;
    match theme {
        Some(theme) => {
            store.dispatch(Action::SetTheme(theme))?;
            println!("Theme set to {theme}");
        }
        None => println!("Theme: {}", store.state().theme),
    }
    Ok(())
}

/// Remove the saved state and reseed the default categories and accounts.
pub fn reset(yes: bool) -> Result<()> {
    if !yes {
        return Err(FinflowError::Other(
            "this deletes all finflow data; run again with --yes to confirm".to_string(),
        ));
    }
    let store = open_store()?.clear()?;
    let state = store.state();
    println!(
        "Cleared all data. Restored {} categories and {} accounts.",
        state.categories.len(),
        state.accounts.len()
    );
    Ok(())
}
