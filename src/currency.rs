use crate::error::{FinflowError, Result};

/// A supported currency with its rate relative to INR.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
    /// Units of this currency per one INR.
    pub rate: f64,
}

pub const CURRENCIES: &[CurrencyInfo] = &[
    CurrencyInfo { code: "INR", name: "Indian Rupee", symbol: "₹", rate: 1.0 },
    CurrencyInfo { code: "USD", name: "US Dollar", symbol: "$", rate: 0.012 },
    CurrencyInfo { code: "EUR", name: "Euro", symbol: "€", rate: 0.011 },
    CurrencyInfo { code: "GBP", name: "British Pound", symbol: "£", rate: 0.0095 },
    CurrencyInfo { code: "JPY", name: "Japanese Yen", symbol: "¥", rate: 1.79 },
    CurrencyInfo { code: "AUD", name: "Australian Dollar", symbol: "A$", rate: 0.018 },
    CurrencyInfo { code: "CAD", name: "Canadian Dollar", symbol: "C$", rate: 0.016 },
    CurrencyInfo { code: "AED", name: "UAE Dirham", symbol: "د.إ", rate: 0.044 },
    CurrencyInfo { code: "SGD", name: "Singapore Dollar", symbol: "S$", rate: 0.016 },
    CurrencyInfo { code: "CHF", name: "Swiss Franc", symbol: "CHF", rate: 0.011 },
];

/// Look up a currency by code, ignoring case and surrounding whitespace.
pub fn lookup(code: &str) -> Result<&'static CurrencyInfo> {
    let wanted = code.trim();
    CURRENCIES
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| FinflowError::UnknownCurrency(wanted.to_string()))
}

/// Display symbol for a code; unknown codes are shown as-is.
pub fn symbol(code: &str) -> &str {
    lookup(code).map(|c| c.symbol).unwrap_or(code)
}

pub fn convert(amount: f64, from: &str, to: &str) -> Result<f64> {
    let from = lookup(from)?;
    let to = lookup(to)?;
    Ok(amount * to.rate / from.rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_convert_from_base() {
        assert!(close(convert(1000.0, "INR", "USD").unwrap(), 12.0));
        assert!(close(convert(100.0, "INR", "JPY").unwrap(), 179.0));
    }

    #[test]
    fn test_convert_between_non_base() {
        // 12 USD is 1000 INR is 11 EUR.
        assert!(close(convert(12.0, "USD", "EUR").unwrap(), 11.0));
        assert!(close(convert(5.0, "gbp", "GBP").unwrap(), 5.0));
    }

    #[test]
    fn test_unknown_code_is_an_error() {
        let err = convert(1.0, "INR", "XYZ").unwrap_err();
        assert!(matches!(err, FinflowError::UnknownCurrency(ref c) if c == "XYZ"));
        assert!(convert(1.0, "", "INR").is_err());
    }

    #[test]
    fn test_symbols() {
        assert_eq!(symbol("INR"), "₹");
        assert_eq!(symbol("aud"), "A$");
        assert_eq!(symbol("CHF"), "CHF");
        assert_eq!(symbol("XYZ"), "XYZ");
    }

    #[test]
    fn test_every_rate_is_positive() {
        assert_eq!(CURRENCIES.len(), 10);
        assert!(CURRENCIES.iter().all(|c| c.rate > 0.0));
    }
}
