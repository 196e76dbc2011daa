use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Closed string enums shared by the store, the JSON layout and the CLI.
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let lower = s.trim().to_lowercase();
                $name::ALL
                    .iter()
                    .find(|v| v.as_str() == lower)
                    .copied()
                    .ok_or_else(|| {
                        let choices: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        format!("'{s}' is not one of: {}", choices.join(", "))
                    })
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Other,
}

string_enum!(TransactionType {
    Income => "income",
    Expense => "expense",
    Other => "other",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Income,
    Expense,
    Both,
}

string_enum!(CategoryType {
    Income => "income",
    Expense => "expense",
    Both => "both",
});

impl CategoryType {
    /// Whether a transaction of `kind` may be filed under a category of this type.
    pub fn allows(&self, kind: TransactionType) -> bool {
        match self {
            CategoryType::Both => true,
            CategoryType::Income => kind == TransactionType::Income,
            CategoryType::Expense => kind != TransactionType::Income,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Bank,
    Cash,
    Credit,
    Debit,
    Emi,
}

string_enum!(AccountType {
    Bank => "bank",
    Cash => "cash",
    Credit => "credit",
    Debit => "debit",
    Emi => "emi",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillFrequency {
    Weekly,
    Monthly,
    Yearly,
}

string_enum!(BillFrequency {
    Weekly => "weekly",
    Monthly => "monthly",
    Yearly => "yearly",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

string_enum!(Theme {
    Light => "light",
    Dark => "dark",
    System => "system",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
    Yearly,
}

string_enum!(BudgetPeriod {
    Weekly => "weekly",
    Monthly => "monthly",
    Yearly => "yearly",
});

// ---------------------------------------------------------------------------
// Category icons
// ---------------------------------------------------------------------------

/// Icons a category can carry. Stored by name; names we don't know fall back
/// to `Tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryIcon {
    Briefcase,
    Laptop,
    Utensils,
    Car,
    ShoppingBag,
    Home,
    Zap,
    Film,
    Heart,
    TrendingUp,
    Gift,
    Coffee,
    Plane,
    Book,
    Music,
    Gamepad2,
    Dumbbell,
    Pill,
    Baby,
    Dog,
    Shirt,
    Scissors,
    Wrench,
    Tag,
}

impl CategoryIcon {
    pub const ALL: &'static [CategoryIcon] = &[
        Self::Briefcase,
        Self::Laptop,
        Self::Utensils,
        Self::Car,
        Self::ShoppingBag,
        Self::Home,
        Self::Zap,
        Self::Film,
        Self::Heart,
        Self::TrendingUp,
        Self::Gift,
        Self::Coffee,
        Self::Plane,
        Self::Book,
        Self::Music,
        Self::Gamepad2,
        Self::Dumbbell,
        Self::Pill,
        Self::Baby,
        Self::Dog,
        Self::Shirt,
        Self::Scissors,
        Self::Wrench,
        Self::Tag,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Briefcase => "Briefcase",
            Self::Laptop => "Laptop",
            Self::Utensils => "Utensils",
            Self::Car => "Car",
            Self::ShoppingBag => "ShoppingBag",
            Self::Home => "Home",
            Self::Zap => "Zap",
            Self::Film => "Film",
            Self::Heart => "Heart",
            Self::TrendingUp => "TrendingUp",
            Self::Gift => "Gift",
            Self::Coffee => "Coffee",
            Self::Plane => "Plane",
            Self::Book => "Book",
            Self::Music => "Music",
            Self::Gamepad2 => "Gamepad2",
            Self::Dumbbell => "Dumbbell",
            Self::Pill => "Pill",
            Self::Baby => "Baby",
            Self::Dog => "Dog",
            Self::Shirt => "Shirt",
            Self::Scissors => "Scissors",
            Self::Wrench => "Wrench",
            Self::Tag => "Tag",
        }
    }

    /// Terminal rendering of the icon.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Briefcase => "💼",
            Self::Laptop => "💻",
            Self::Utensils => "🍴",
            Self::Car => "🚗",
            Self::ShoppingBag => "🛍",
            Self::Home => "🏠",
            Self::Zap => "⚡",
            Self::Film => "🎬",
            Self::Heart => "❤",
            Self::TrendingUp => "📈",
            Self::Gift => "🎁",
            Self::Coffee => "☕",
            Self::Plane => "✈",
            Self::Book => "📖",
            Self::Music => "🎵",
            Self::Gamepad2 => "🎮",
            Self::Dumbbell => "🏋",
            Self::Pill => "💊",
            Self::Baby => "👶",
            Self::Dog => "🐕",
            Self::Shirt => "👕",
            Self::Scissors => "✂",
            Self::Wrench => "🔧",
            Self::Tag => "🏷",
        }
    }

    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .iter()
            .find(|icon| icon.name().eq_ignore_ascii_case(name.trim()))
            .copied()
            .unwrap_or(Self::Tag)
    }
}

impl From<String> for CategoryIcon {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<CategoryIcon> for String {
    fn from(icon: CategoryIcon) -> Self {
        icon.name().to_string()
    }
}

impl fmt::Display for CategoryIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    pub description: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
    pub account: String,
    pub currency: String,
}

impl Transaction {
    /// Contribution to the running balance: income adds, expense subtracts.
    pub fn signed_amount(&self) -> f64 {
        match self.transaction_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
            TransactionType::Other => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: CategoryIcon,
    pub color: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub balance: f64,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number_last4: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub category: String,
    pub is_paid: bool,
    pub is_recurring: bool,
    pub frequency: BillFrequency,
}

/// A spending cap for one category over a period. Evaluated, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub category: String,
    pub limit: f64,
    pub period: BudgetPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceState {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub bills: Vec<Bill>,
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default)]
    pub theme: Theme,
}

pub const DEFAULT_BASE_CURRENCY: &str = "INR";

fn default_base_currency() -> String {
    DEFAULT_BASE_CURRENCY.to_string()
}

// (id, name, icon, color, type)
const DEFAULT_CATEGORIES: &[(&str, &str, CategoryIcon, &str, CategoryType)] = &[
    ("1", "Salary", CategoryIcon::Briefcase, "#10B981", CategoryType::Income),
    ("2", "Freelance", CategoryIcon::Laptop, "#3B82F6", CategoryType::Income),
    ("3", "Food", CategoryIcon::Utensils, "#F59E0B", CategoryType::Expense),
    ("4", "Transport", CategoryIcon::Car, "#8B5CF6", CategoryType::Expense),
    ("5", "Shopping", CategoryIcon::ShoppingBag, "#EC4899", CategoryType::Expense),
    ("6", "Rent", CategoryIcon::Home, "#EF4444", CategoryType::Expense),
    ("7", "Utilities", CategoryIcon::Zap, "#6366F1", CategoryType::Expense),
    ("8", "Entertainment", CategoryIcon::Film, "#14B8A6", CategoryType::Expense),
    ("9", "Healthcare", CategoryIcon::Heart, "#F43F5E", CategoryType::Expense),
    ("10", "Investment", CategoryIcon::TrendingUp, "#22C55E", CategoryType::Income),
];

// (id, name, type)
const DEFAULT_ACCOUNTS: &[(&str, &str, AccountType)] = &[
    ("1", "Cash", AccountType::Cash),
    ("2", "Bank Account", AccountType::Bank),
];

pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(id, name, icon, color, kind)| Category {
            id: id.to_string(),
            name: name.to_string(),
            icon: *icon,
            color: color.to_string(),
            category_type: *kind,
        })
        .collect()
}

pub fn default_accounts() -> Vec<Account> {
    DEFAULT_ACCOUNTS
        .iter()
        .map(|(id, name, kind)| Account {
            id: id.to_string(),
            name: name.to_string(),
            account_type: *kind,
            balance: 0.0,
            currency: DEFAULT_BASE_CURRENCY.to_string(),
            card_number_last4: None,
            brand: None,
        })
        .collect()
}

impl Default for FinanceState {
    fn default() -> Self {
        Self {
            transactions: Vec::new(),
            categories: default_categories(),
            accounts: default_accounts(),
            bills: Vec::new(),
            base_currency: default_base_currency(),
            theme: Theme::System,
        }
    }
}

/// Fresh record identifier: 16 random hex digits.
pub fn new_id() -> String {
    format!("{:016x}", rand::thread_rng().gen::<u64>())
}
