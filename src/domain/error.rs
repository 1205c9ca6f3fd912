//! Domain error types.

use chrono::NaiveDate;
use std::fmt;

/// Which end of the holding period a quote lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Entry,
    Exit,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Entry => write!(f, "buy"),
            Boundary::Exit => write!(f, "sell"),
        }
    }
}

/// A malformed or inconsistent caller request. Never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("principal must be positive, got {0}")]
    NonPositivePrincipal(f64),

    #[error("buy date {buy} is after sell date {sell}")]
    BuyAfterSell { buy: NaiveDate, sell: NaiveDate },

    #[error("window start {from} is after window end {to}")]
    InvertedWindow { from: NaiveDate, to: NaiveDate },

    #[error("unknown period code: {0}")]
    UnknownPeriod(String),

    #[error("invalid {field} date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },
}

/// Top-level error type for tradesim.
#[derive(Debug, thiserror::Error)]
pub enum TradesimError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no quote data between {start} and {end}")]
    NoData { start: NaiveDate, end: NaiveDate },

    #[error("no quote on {boundary} date {date}")]
    MissingQuote { boundary: Boundary, date: NaiveDate },

    #[error("invalid close price {price} on {date}")]
    DataIntegrity { date: NaiveDate, price: f64 },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradesimError {
    /// Stable snake_case label for the error kind, used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            TradesimError::Validation(_) => "validation",
            TradesimError::NoData { .. } => "no_data",
            TradesimError::MissingQuote { .. } => "missing_quote",
            TradesimError::DataIntegrity { .. } => "data_integrity",
            TradesimError::Database { .. } | TradesimError::DatabaseQuery { .. } => "database",
            TradesimError::ConfigParse { .. }
            | TradesimError::ConfigMissing { .. }
            | TradesimError::ConfigInvalid { .. } => "config",
            TradesimError::Io(_) => "io",
        }
    }
}

impl From<&TradesimError> for std::process::ExitCode {
    fn from(err: &TradesimError) -> Self {
        let code: u8 = match err {
            TradesimError::Io(_) => 1,
            TradesimError::ConfigParse { .. }
            | TradesimError::ConfigMissing { .. }
            | TradesimError::ConfigInvalid { .. } => 2,
            TradesimError::Database { .. } | TradesimError::DatabaseQuery { .. } => 3,
            TradesimError::Validation(_) => 4,
            TradesimError::NoData { .. } | TradesimError::MissingQuote { .. } => 5,
            TradesimError::DataIntegrity { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
