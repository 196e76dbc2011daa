use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinflowError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    InvalidAmount(String),

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Could not parse transaction. Please check your input.")]
    Unparseable,

    #[error("No amount detected; enter the amount manually before importing")]
    MissingAmount,

    #[error("Please wait a moment before parsing again")]
    RateLimited,

    #[error("Input too long. Maximum {0} characters allowed.")]
    InputTooLong(usize),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FinflowError>;
