use std::collections::HashSet;

use serde_json::Value;

use crate::error::{FinflowError, Result};
use crate::models::{Account, Bill, Category, FinanceState, Transaction};

pub const MAX_AMOUNT: f64 = 10_000_000.0;
pub const MIN_AMOUNT: f64 = 0.0;

pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_BILL_NAME_LEN: usize = 200;
pub const MAX_ICON_LEN: usize = 50;
pub const MAX_COLOR_LEN: usize = 20;
pub const MAX_CURRENCY_LEN: usize = 10;
pub const MAX_BRAND_LEN: usize = 50;
pub const MAX_LAST4_LEN: usize = 4;

// ---------------------------------------------------------------------------
// Single-field checks used by forms before dispatching
// ---------------------------------------------------------------------------

/// Outcome of checking one user-entered number.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCheck {
    pub valid: bool,
    pub value: f64,
    pub error: Option<String>,
}

impl FieldCheck {
    fn ok(value: f64) -> Self {
        Self { valid: true, value, error: None }
    }

    fn fail(value: f64, error: impl Into<String>) -> Self {
        Self { valid: false, value, error: Some(error.into()) }
    }

    /// Turn a failed check into an error the caller can propagate.
    pub fn into_result(self) -> Result<f64> {
        match self.error {
            None => Ok(self.value),
            Some(msg) => Err(FinflowError::InvalidAmount(msg)),
        }
    }
}

fn parse_number(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

pub fn validate_amount(input: &str) -> FieldCheck {
    let Some(value) = parse_number(input) else {
        return FieldCheck::fail(0.0, "Please enter a valid number");
    };
    if value < MIN_AMOUNT {
        return FieldCheck::fail(value, "Amount cannot be negative");
    }
    if value > MAX_AMOUNT {
        return FieldCheck::fail(
            value,
            format!("Amount cannot exceed {}", group_thousands(MAX_AMOUNT)),
        );
    }
    FieldCheck::ok(value)
}

/// Balances may be negative (credit lines), but stay within the global bound.
pub fn validate_balance(input: &str) -> FieldCheck {
    let Some(value) = parse_number(input) else {
        return FieldCheck::fail(0.0, "Please enter a valid number");
    };
    if !(-MAX_AMOUNT..=MAX_AMOUNT).contains(&value) {
        let bound = group_thousands(MAX_AMOUNT);
        return FieldCheck::fail(value, format!("Balance must be between -{bound} and {bound}"));
    }
    FieldCheck::ok(value)
}

fn group_thousands(val: f64) -> String {
    let digits = format!("{}", val.trunc() as i64);
    let mut out = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.chars().rev().collect()
}

// ---------------------------------------------------------------------------
// Record checks shared by the loader and the store
// ---------------------------------------------------------------------------

fn invalid(field: &str, reason: impl AsRef<str>) -> FinflowError {
    FinflowError::Validation(format!("{field}: {}", reason.as_ref()))
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(invalid(field, format!("{len} characters exceeds the maximum of {max}")));
    }
    Ok(())
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(invalid(field, "not a finite number"));
    }
    if value < min || value > max {
        return Err(invalid(field, format!("{value} is outside [{min}, {max}]")));
    }
    Ok(())
}

pub fn check_transaction(t: &Transaction) -> Result<()> {
    check_range("transaction.amount", t.amount, MIN_AMOUNT, MAX_AMOUNT)?;
    check_len("transaction.description", &t.description, MAX_DESCRIPTION_LEN)?;
    check_len("transaction.category", &t.category, MAX_NAME_LEN)?;
    check_len("transaction.account", &t.account, MAX_NAME_LEN)?;
    check_len("transaction.currency", &t.currency, MAX_CURRENCY_LEN)?;
    Ok(())
}

pub fn check_category(c: &Category) -> Result<()> {
    check_len("category.name", &c.name, MAX_NAME_LEN)?;
    check_len("category.color", &c.color, MAX_COLOR_LEN)?;
    check_len("category.icon", c.icon.name(), MAX_ICON_LEN)?;
    Ok(())
}

pub fn check_account(a: &Account) -> Result<()> {
    check_len("account.name", &a.name, MAX_NAME_LEN)?;
    check_range("account.balance", a.balance, -MAX_AMOUNT, MAX_AMOUNT)?;
    check_len("account.currency", &a.currency, MAX_CURRENCY_LEN)?;
    if let Some(last4) = &a.card_number_last4 {
        check_len("account.cardNumberLast4", last4, MAX_LAST4_LEN)?;
    }
    if let Some(brand) = &a.brand {
        check_len("account.brand", brand, MAX_BRAND_LEN)?;
    }
    Ok(())
}

pub fn check_bill(b: &Bill) -> Result<()> {
    check_len("bill.name", &b.name, MAX_BILL_NAME_LEN)?;
    check_range("bill.amount", b.amount, MIN_AMOUNT, MAX_AMOUNT)?;
    check_len("bill.category", &b.category, MAX_NAME_LEN)?;
    Ok(())
}

pub fn check_currency_code(code: &str) -> Result<()> {
    if code.trim().is_empty() {
        return Err(invalid("baseCurrency", "must not be empty"));
    }
    check_len("baseCurrency", code, MAX_CURRENCY_LEN)
}

fn check_unique_ids<'a>(collection: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(invalid(collection, format!("duplicate id '{id}'")));
        }
    }
    Ok(())
}

/// Only the last four digits of a card number ever leave this function.
pub fn last_four(card_number: &str) -> String {
    let digits: Vec<char> = card_number.chars().filter(|c| c.is_ascii_digit()).collect();
    let start = digits.len().saturating_sub(MAX_LAST4_LEN);
    digits[start..].iter().collect()
}

/// Older saves kept the full card number and expiry on accounts. Reduce them
/// to `cardNumberLast4` before anything else looks at the data.
fn strip_legacy_card_fields(raw: &mut Value) {
    let Some(accounts) = raw.get_mut("accounts").and_then(Value::as_array_mut) else {
        return;
    };
    for account in accounts.iter_mut().filter_map(Value::as_object_mut) {
        let full = account.remove("cardNumber");
        account.remove("expiryDate");
        let has_last4 = account
            .get("cardNumberLast4")
            .is_some_and(|v| v.as_str().is_some_and(|s| !s.is_empty()));
        if has_last4 {
            continue;
        }
        if let Some(number) = full.as_ref().and_then(Value::as_str) {
            let last4 = last_four(number);
            if !last4.is_empty() {
                account.insert("cardNumberLast4".to_string(), Value::String(last4));
            }
        }
    }
}

/// Parse untrusted persisted data into a fully typed state.
///
/// Missing collections and scalars take their defaults. Any malformed record,
/// out-of-range number, over-long string or duplicate id fails the whole
/// state; callers must discard it rather than keep a partial result.
pub fn validate_finance_state(mut raw: Value) -> Result<FinanceState> {
    if !raw.is_object() {
        return Err(FinflowError::Validation("expected a JSON object".to_string()));
    }
    strip_legacy_card_fields(&mut raw);

    let state: FinanceState =
        serde_json::from_value(raw).map_err(|e| FinflowError::Validation(e.to_string()))?;

    for t in &state.transactions {
        check_transaction(t)?;
    }
    for c in &state.categories {
        check_category(c)?;
    }
    for a in &state.accounts {
        check_account(a)?;
    }
    for b in &state.bills {
        check_bill(b)?;
    }
    check_len("baseCurrency", &state.base_currency, MAX_CURRENCY_LEN)?;

    check_unique_ids("transactions", state.transactions.iter().map(|t| t.id.as_str()))?;
    check_unique_ids("categories", state.categories.iter().map(|c| c.id.as_str()))?;
    check_unique_ids("accounts", state.accounts.iter().map(|a| a.id.as_str()))?;
    check_unique_ids("bills", state.bills.iter().map(|b| b.id.as_str()))?;

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Theme, TransactionType};
    use serde_json::json;

    #[test]
    fn test_validate_amount_rejects_negative() {
        let check = validate_amount("-5");
        assert!(!check.valid);
        assert_eq!(check.value, -5.0);
        assert_eq!(check.error.as_deref(), Some("Amount cannot be negative"));
    }

    #[test]
    fn test_validate_amount_rejects_over_max() {
        let check = validate_amount("20000000");
        assert!(!check.valid);
        assert_eq!(check.error.as_deref(), Some("Amount cannot exceed 10,000,000"));
    }

    #[test]
    fn test_validate_amount_accepts_decimal() {
        let check = validate_amount("100.5");
        assert!(check.valid);
        assert_eq!(check.value, 100.5);
        assert!(check.error.is_none());
    }

    #[test]
    fn test_validate_amount_rejects_garbage_and_non_finite() {
        for input in ["", "abc", "NaN", "inf"] {
            let check = validate_amount(input);
            assert!(!check.valid, "{input} should be invalid");
            assert_eq!(check.error.as_deref(), Some("Please enter a valid number"));
        }
    }

    #[test]
    fn test_validate_balance_allows_negative() {
        assert!(validate_balance("-2500").valid);
        let check = validate_balance("-10000001");
        assert!(!check.valid);
        assert!(check.error.unwrap().contains("-10,000,000 and 10,000,000"));
    }

    #[test]
    fn test_into_result() {
        assert_eq!(validate_amount("12").into_result().unwrap(), 12.0);
        let err = validate_amount("-1").into_result().unwrap_err();
        assert_eq!(err.to_string(), "Amount cannot be negative");
    }

    #[test]
    fn test_empty_object_gets_defaults() {
        let state = validate_finance_state(json!({})).unwrap();
        assert!(state.transactions.is_empty());
        assert!(state.categories.is_empty());
        assert_eq!(state.base_currency, "INR");
        assert_eq!(state.theme, Theme::System);
    }

    #[test]
    fn test_valid_state_parses() {
        let state = validate_finance_state(json!({
            "transactions": [{
                "id": "t1", "amount": 250, "description": "Groceries",
                "date": "2025-03-02", "type": "expense", "category": "Food",
                "account": "Cash", "currency": "INR"
            }],
            "baseCurrency": "USD",
            "theme": "dark"
        }))
        .unwrap();
        assert_eq!(state.transactions.len(), 1);
        assert_eq!(state.transactions[0].transaction_type, TransactionType::Expense);
        assert_eq!(state.transactions[0].amount, 250.0);
        assert_eq!(state.base_currency, "USD");
        assert_eq!(state.theme, Theme::Dark);
    }

    #[test]
    fn test_rejects_bad_enum_and_bounds() {
        let bad_type = json!({"transactions": [{
            "id": "t1", "amount": 1, "description": "", "date": "2025-03-02",
            "type": "transfer", "category": "", "account": "", "currency": "INR"
        }]});
        assert!(validate_finance_state(bad_type).is_err());

        let too_big = json!({"bills": [{
            "id": "b1", "name": "Rent", "amount": 20000000, "dueDate": "2025-03-02",
            "category": "Rent", "isPaid": false, "isRecurring": true, "frequency": "monthly"
        }]});
        let err = validate_finance_state(too_big).unwrap_err().to_string();
        assert!(err.contains("bill.amount"), "got: {err}");

        let bad_theme = json!({"theme": "neon"});
        assert!(validate_finance_state(bad_theme).is_err());

        assert!(validate_finance_state(json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_rejects_over_long_strings_and_bad_dates() {
        let long = "x".repeat(501);
        let state = json!({"transactions": [{
            "id": "t1", "amount": 1, "description": long, "date": "2025-03-02",
            "type": "income", "category": "", "account": "", "currency": "INR"
        }]});
        assert!(validate_finance_state(state).is_err());

        let bad_date = json!({"transactions": [{
            "id": "t1", "amount": 1, "description": "", "date": "2025-02-30",
            "type": "income", "category": "", "account": "", "currency": "INR"
        }]});
        assert!(validate_finance_state(bad_date).is_err());
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let state = json!({"categories": [
            {"id": "1", "name": "A", "icon": "Tag", "color": "#000", "type": "both"},
            {"id": "1", "name": "B", "icon": "Tag", "color": "#000", "type": "both"}
        ]});
        let err = validate_finance_state(state).unwrap_err().to_string();
        assert!(err.contains("duplicate id '1'"), "got: {err}");
    }

    #[test]
    fn test_legacy_card_number_reduced_to_last_four() {
        let state = validate_finance_state(json!({"accounts": [{
            "id": "a1", "name": "Card", "type": "credit", "balance": -300,
            "currency": "INR", "cardNumber": "4111 1111 1111 1234", "expiryDate": "12/29"
        }]}))
        .unwrap();
        assert_eq!(state.accounts[0].card_number_last4.as_deref(), Some("1234"));
    }

    #[test]
    fn test_last4_longer_than_four_rejected() {
        let state = json!({"accounts": [{
            "id": "a1", "name": "Card", "type": "debit", "balance": 0,
            "currency": "INR", "cardNumberLast4": "12345"
        }]});
        assert!(validate_finance_state(state).is_err());
    }

    #[test]
    fn test_last_four() {
        assert_eq!(last_four("4111-1111-1111-9876"), "9876");
        assert_eq!(last_four("12"), "12");
        assert_eq!(last_four(""), "");
    }
}
