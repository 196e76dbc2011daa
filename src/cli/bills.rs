use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_store, parse_date};
use crate::error::{FinflowError, Result};
use crate::fmt::money;
use crate::metrics::{bill_schedule, days_until_due};
use crate::models::{new_id, Bill, BillFrequency};
use crate::store::{today, Action};
use crate::validation::validate_amount;

fn due_label(days: i64) -> String {
    match days {
        d if d < 0 => format!("{} days overdue", -d).red().to_string(),
        0 => "due today".yellow().to_string(),
        1 => "due tomorrow".yellow().to_string(),
        d if d <= 7 => format!("in {d} days").yellow().to_string(),
        d => format!("in {d} days"),
    }
}

pub fn list() -> Result<()> {
    let store = open_store()?;
    let state = store.state();
    let schedule = bill_schedule(&state.bills);
    let now = today();

    if state.bills.is_empty() {
        println!("No bills.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Amount", "Due", "When", "Category", "Repeats", "Status"]);
    let rows = schedule
        .pending
        .iter()
        .chain(schedule.paid.iter());
    for b in rows {
        let (when, status) = if b.is_paid {
            (String::new(), "paid".green().to_string())
        } else {
            (due_label(days_until_due(b, now)), "pending".to_string())
        };
        table.add_row(vec![
            Cell::new(&b.id),
            Cell::new(&b.name),
            Cell::new(money(b.amount, &state.base_currency)),
            Cell::new(b.due_date.format("%Y-%m-%d")),
            Cell::new(when),
            Cell::new(&b.category),
            Cell::new(if b.is_recurring { b.frequency.as_str() } else { "-" }),
            Cell::new(status),
        ]);
    }
    println!("Bills\n{table}");
    println!(
        "Pending: {} ({} bills)",
        money(schedule.total_pending, &state.base_currency),
        schedule.pending.len()
    );
    Ok(())
}

pub fn add(
    name: &str,
    amount: &str,
    due: &str,
    category: &str,
    recurring: bool,
    frequency: BillFrequency,
) -> Result<()> {
    let mut store = open_store()?;
    let bill = Bill {
        id: new_id(),
        name: name.trim().to_string(),
        amount: validate_amount(amount).into_result()?,
        due_date: parse_date(due)?,
        category: store
            .category_named(category)
            .map_or_else(|| category.trim().to_string(), |c| c.name.clone()),
        is_paid: false,
        is_recurring: recurring,
        frequency,
    };
    let id = bill.id.clone();
    store.dispatch(Action::AddBill(bill))?;
    println!("Added bill: {} ({id})", name.trim());
    Ok(())
}

pub fn pay(id: &str, undo: bool) -> Result<()> {
    let mut store = open_store()?;
    let mut bill = store
        .bill(id)
        .cloned()
        .ok_or_else(|| FinflowError::NotFound(format!("bill {id}")))?;
    bill.is_paid = !undo;
    let name = bill.name.clone();
    store.dispatch(Action::UpdateBill(bill))?;
    if undo {
        println!("Marked {name} as pending");
    } else {
        println!("Marked {name} as paid");
    }
    Ok(())
}

pub fn delete(id: &str) -> Result<()> {
    let mut store = open_store()?;
    let name = store
        .bill(id)
        .map(|b| b.name.clone())
        .ok_or_else(|| FinflowError::NotFound(format!("bill {id}")))?;
    store.dispatch(Action::DeleteBill(id.to_string()))?;
    println!("Deleted bill: {name}");
    Ok(())
}
