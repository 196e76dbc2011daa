use std::time::{Duration, Instant};

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::{FinflowError, Result};
use crate::models::{new_id, Transaction, TransactionType};
use crate::validation::{MAX_AMOUNT, MIN_AMOUNT};

pub const MAX_INPUT_LEN: usize = 1000;
pub const MAX_PARSED_DESCRIPTION_LEN: usize = 200;
pub const PARSE_COOLDOWN: Duration = Duration::from_millis(1000);
pub const PARSE_DELAY: Duration = Duration::from_millis(500);

const AMOUNT_PATTERN: &str = r"(?:rs\.?|₹|inr|\$|usd|€|eur)?\s*([0-9]{1,10}(?:,[0-9]{3})*(?:\.[0-9]{1,2})?)";
const DATE_PATTERN: &str = r"([0-9]{1,2})[/\-]([0-9]{1,2})[/\-]([0-9]{2,4})";

const EXPENSE_KEYWORDS: &[&str] = &[
    "spent", "paid", "bought", "purchase", "debited", "debit", "expense", "payment", "charge",
];
const INCOME_KEYWORDS: &[&str] = &[
    "received", "credited", "credit", "salary", "income", "earned", "refund", "cashback",
];

// First match wins, so order matters.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Food",
        &[
            "food", "lunch", "dinner", "breakfast", "restaurant", "cafe", "coffee", "snack", "meal",
            "zomato", "swiggy",
        ],
    ),
    (
        "Transport",
        &["uber", "ola", "cab", "taxi", "petrol", "fuel", "metro", "bus", "transport", "travel"],
    ),
    ("Shopping", &["amazon", "flipkart", "shopping", "clothes", "shoes", "purchase"]),
    (
        "Utilities",
        &["electricity", "water", "gas", "internet", "wifi", "phone", "bill", "recharge"],
    ),
    ("Entertainment", &["movie", "netflix", "spotify", "game", "entertainment"]),
    ("Healthcare", &["doctor", "hospital", "medicine", "pharmacy", "health"]),
    ("Rent", &["rent", "housing"]),
    ("Salary", &["salary", "income", "payment received"]),
    ("Freelance", &["freelance", "project payment", "client payment"]),
];

/// What the parser could extract from a message. `amount` is `None` when no
/// usable amount was found; such a result cannot be imported as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTransaction {
    pub amount: Option<f64>,
    pub description: String,
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    pub category: String,
}

impl ParsedTransaction {
    pub fn into_transaction(self, account: &str, currency: &str) -> Result<Transaction> {
        let amount = self.amount.ok_or(FinflowError::MissingAmount)?;
        Ok(Transaction {
            id: new_id(),
            amount,
            description: self.description,
            date: self.date,
            transaction_type: self.transaction_type,
            category: self.category,
            account: account.to_string(),
            currency: currency.to_string(),
        })
    }
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| haystack.contains(kw))
}

/// Compiled patterns for turning bank SMS text into a transaction draft.
pub struct TextParser {
    amount: Regex,
    date: Regex,
    stopwords: Regex,
    markup: Regex,
    script_scheme: Regex,
    event_handler: Regex,
    unsafe_chars: Regex,
    whitespace: Regex,
}

impl TextParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            amount: Regex::new(&format!("(?i){AMOUNT_PATTERN}"))?,
            date: Regex::new(DATE_PATTERN)?,
            stopwords: Regex::new(r"(?i)\b(?:debited|credited|from|to|for|on|at)\b")?,
            markup: Regex::new(r"[<>]")?,
            script_scheme: Regex::new(r"(?i)javascript:")?,
            event_handler: Regex::new(r"(?i)on[a-z0-9_]+=")?,
            unsafe_chars: Regex::new(r#"[<>'"&]"#)?,
            whitespace: Regex::new(r"\s+")?,
        })
    }

    /// Cap the length and strip markup, `javascript:` and `on...=` handlers.
    pub fn sanitize_input(&self, input: &str) -> String {
        let capped = truncate_chars(input, MAX_INPUT_LEN);
        let text = self.markup.replace_all(capped, "");
        let text = self.script_scheme.replace_all(&text, "");
        let text = self.event_handler.replace_all(&text, "");
        text.trim().to_string()
    }

    fn sanitize_description(&self, description: &str) -> String {
        let text = self.unsafe_chars.replace_all(description, "");
        let text = self.whitespace.replace_all(&text, " ");
        truncate_chars(text.trim(), MAX_PARSED_DESCRIPTION_LEN).to_string()
    }

    fn extract_amount(&self, text: &str) -> Option<f64> {
        let digits = self.amount.captures(text)?.get(1)?.as_str().replace(',', "");
        digits
            .parse::<f64>()
            .ok()
            .filter(|v| (MIN_AMOUNT..=MAX_AMOUNT).contains(v))
    }

    fn extract_date(&self, text: &str, today: NaiveDate) -> Option<NaiveDate> {
        let caps = self.date.captures(text)?;
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year_digits = &caps[3];
        let year: i32 = if year_digits.len() == 2 {
            2000 + year_digits.parse::<i32>().ok()?
        } else {
            year_digits.parse().ok()?
        };
        let years = (today.year() - 5)..=(today.year() + 1);
        if !years.contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn describe(&self, text: &str, kind: TransactionType) -> String {
        let text = self.date.replace_all(text, "");
        let text = self.amount.replace_all(&text, "");
        let text = self.stopwords.replace_all(&text, "");
        let description = self.sanitize_description(&text);
        if description.chars().count() < 3 {
            match kind {
                TransactionType::Income => "Income transaction".to_string(),
                _ => "Expense transaction".to_string(),
            }
        } else {
            description
        }
    }

    pub fn parse(&self, input: &str, today: NaiveDate) -> Result<ParsedTransaction> {
        let text = self.sanitize_input(input);
        if text.chars().count() < 3 {
            return Err(FinflowError::Unparseable);
        }
        let lower = text.to_lowercase();

        let transaction_type = if contains_any(&lower, EXPENSE_KEYWORDS) {
            TransactionType::Expense
        } else if contains_any(&lower, INCOME_KEYWORDS) {
            TransactionType::Income
        } else {
            TransactionType::Other
        };

        let default_category = match transaction_type {
            TransactionType::Income => "Salary",
            _ => "Food",
        };
        let category = CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| contains_any(&lower, keywords))
            .map_or(default_category, |(name, _)| *name);

        Ok(ParsedTransaction {
            amount: self.extract_amount(&text),
            description: self.describe(&text, transaction_type),
            date: self.extract_date(&text, today).unwrap_or(today),
            transaction_type,
            category: category.to_string(),
        })
    }
}

pub fn parse_transaction_text(input: &str, today: NaiveDate) -> Result<ParsedTransaction> {
    TextParser::new()?.parse(input, today)
}

// ---------------------------------------------------------------------------
// Throttled entry point
// ---------------------------------------------------------------------------

/// Front door for pasted messages: rate-limits calls, bounds input length and
/// pauses briefly before answering.
pub struct TextImporter {
    parser: TextParser,
    cooldown: Duration,
    delay: Duration,
    last_parse: Option<Instant>,
}

impl TextImporter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: TextParser::new()?,
            cooldown: PARSE_COOLDOWN,
            delay: PARSE_DELAY,
            last_parse: None,
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn parse(&mut self, input: &str, today: NaiveDate) -> Result<ParsedTransaction> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(FinflowError::Unparseable);
        }

        let now = Instant::now();
        if let Some(last) = self.last_parse {
            if now.duration_since(last) < self.cooldown {
                return Err(FinflowError::RateLimited);
            }
        }
        self.last_parse = Some(now);

        if trimmed.chars().count() > MAX_INPUT_LEN {
            return Err(FinflowError::InputTooLong(MAX_INPUT_LEN));
        }

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let parsed = self.parser.parse(trimmed, today)?;
        debug!(
            amount = ?parsed.amount,
            kind = %parsed.transaction_type,
            category = %parsed.category,
            "parsed message"
        );
        Ok(parsed)
    }
}
