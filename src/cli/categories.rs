use comfy_table::{Cell, Table};

use crate::cli::open_store;
use crate::error::{FinflowError, Result};
use crate::fmt::money;
use crate::metrics::category_spending;
use crate::models::{new_id, Category, CategoryIcon, CategoryType};
use crate::store::Action;

pub fn list() -> Result<()> {
    let store = open_store()?;
    let state = store.state();
    let mut table = Table::new();
    table.set_header(vec!["ID", "", "Name", "Type", "Color", "Spent"]);
    for c in &state.categories {
        table.add_row(vec![
            Cell::new(&c.id),
            Cell::new(c.icon.glyph()),
            Cell::new(&c.name),
            Cell::new(c.category_type),
            Cell::new(&c.color),
            Cell::new(money(
                category_spending(&state.transactions, &c.name),
                &state.base_currency,
            )),
        ]);
    }
    println!("Categories\n{table}");
    Ok(())
}

pub fn add(name: &str, category_type: CategoryType, icon: &str, color: &str) -> Result<()> {
    let mut store = open_store()?;
    if store.category_named(name).is_some() {
        return Err(FinflowError::Validation(format!("category '{name}' already exists")));
    }
    let category = Category {
        id: new_id(),
        name: name.trim().to_string(),
        icon: CategoryIcon::from_name(icon),
        color: color.trim().to_string(),
        category_type,
    };
    let id = category.id.clone();
    store.dispatch(Action::AddCategory(category))?;
    println!("Added category: {} ({id})", name.trim());
    Ok(())
}

pub fn edit(
    id: &str,
    name: Option<String>,
    category_type: Option<CategoryType>,
    icon: Option<String>,
    color: Option<String>,
) -> Result<()> {
    let mut store = open_store()?;
    let mut category = store
        .category(id)
        .cloned()
        .ok_or_else(|| FinflowError::NotFound(format!("category {id}")))?;
    if let Some(name) = name {
        category.name = name.trim().to_string();
    }
    if let Some(kind) = category_type {
        category.category_type = kind;
    }
    if let Some(icon) = icon {
        category.icon = CategoryIcon::from_name(&icon);
    }
    if let Some(color) = color {
        category.color = color.trim().to_string();
    }
    store.dispatch(Action::UpdateCategory(category))?;
    println!("Updated category {id}");
    Ok(())
}

pub fn delete(id: &str) -> Result<()> {
    let mut store = open_store()?;
    let name = store
        .category(id)
        .map(|c| c.name.clone())
        .ok_or_else(|| FinflowError::NotFound(format!("category {id}")))?;
    store.dispatch(Action::DeleteCategory(id.to_string()))?;
    println!("Deleted category: {name}");
    Ok(())
}
