pub mod cli;
pub mod currency;
pub mod error;
pub mod export;
pub mod fmt;
pub mod metrics;
pub mod models;
pub mod parser;
pub mod settings;
pub mod storage;
pub mod store;
pub mod validation;
