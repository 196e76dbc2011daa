use crate::currency;

fn group_thousands(int_part: &str) -> String {
    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    with_commas.chars().rev().collect()
}

/// Format an amount with a symbol and thousands separators: ₹1,234.56
pub fn money_with(val: f64, symbol: &str) -> String {
    let negative = val < 0.0;
    let fixed = format!("{:.2}", val.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let grouped = group_thousands(int_part);

    if negative && fixed != "0.00" {
        format!("-{symbol}{grouped}.{dec_part}")
    } else {
        format!("{symbol}{grouped}.{dec_part}")
    }
}

/// Format an amount in the given currency code, e.g. `money(12.5, "USD")` is `$12.50`.
pub fn money(val: f64, currency_code: &str) -> String {
    money_with(val, currency::symbol(currency_code))
}

/// Amount with an explicit sign for display in ledgers: +₹500.00 / -₹500.00
pub fn signed_money(val: f64, currency_code: &str) -> String {
    if val > 0.0 {
        format!("+{}", money(val, currency_code))
    } else {
        money(val, currency_code)
    }
}

pub fn percent(val: f64) -> String {
    format!("{val:.1}%")
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
