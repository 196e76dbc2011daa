use crate::cli::open_store;
use crate::error::Result;
use crate::fmt::{format_bytes, money};
use crate::settings::{load_settings, settings_path};
use crate::storage::{DB_FILE, STATE_KEY};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join(DB_FILE);

    println!("Settings:   {}", settings_path().display());
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());
    println!("Dev mode:   {}", if settings.dev_mode { "on" } else { "off" });

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `finflow init` to set up.");
        return Ok(());
    }

    let size = std::fs::metadata(&db_path)?.len();
    println!("DB size:    {}", format_bytes(size));

    let store = open_store()?;
    if let Some(bytes) = store.storage().item_size(STATE_KEY)? {
        println!("State:      {}", format_bytes(bytes.max(0) as u64));
    }
    let state = store.state();
    let currency = state.base_currency.as_str();

    println!();
    println!("Transactions:  {}", state.transactions.len());
    println!("Categories:    {}", state.categories.len());
    println!("Accounts:      {}", state.accounts.len());
    println!("Bills:         {}", state.bills.len());
    println!("Currency:      {currency}");
    println!("Theme:         {}", state.theme);
    println!("Balance:       {}", money(store.total_balance(), currency));
    Ok(())
}
