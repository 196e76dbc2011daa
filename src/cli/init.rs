use std::path::PathBuf;

use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_file_exists, shellexpand_path};
use crate::storage::{SqliteStorage, DB_FILE};
use crate::store::Store;

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    } else if !settings_file_exists() {
        // First run: offer the default location.
        println!("Data directory [{}]: ", settings.data_dir);
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).ok();
        let chosen = input.trim();
        if !chosen.is_empty() {
            settings.data_dir = shellexpand_path(chosen);
        }
    }

    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;
    std::fs::create_dir_all(resolved.join("exports"))?;

    // Opening the store seeds the default categories and accounts.
    let store = Store::open(SqliteStorage::open(&resolved.join(DB_FILE))?)?;

    println!("Initialized finflow at {}", resolved.display());
    println!(
        "{} categories, {} accounts, base currency {}",
        store.state().categories.len(),
        store.state().accounts.len(),
        store.state().base_currency
    );
    Ok(())
}
