#![allow(dead_code)]

use chrono::NaiveDate;
pub use tradesim::domain::quote::DailyQuote;
use tradesim::domain::error::TradesimError;
use tradesim::ports::quote_port::QuoteSeriesProvider;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory provider that honours the range contract but returns quotes in
/// insertion order, and counts how often it was asked.
pub struct MockQuoteProvider {
    pub quotes: Vec<DailyQuote>,
    pub error: Option<String>,
    pub calls: AtomicUsize,
}

impl MockQuoteProvider {
    pub fn new() -> Self {
        Self {
            quotes: Vec::new(),
            error: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_quotes(mut self, quotes: Vec<DailyQuote>) -> Self {
        self.quotes = quotes;
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl QuoteSeriesProvider for MockQuoteProvider {
    fn fetch_quotes(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyQuote>, TradesimError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.error {
            return Err(TradesimError::Database {
                reason: reason.clone(),
            });
        }
        Ok(self
            .quotes
            .iter()
            .filter(|q| q.date >= start_date && q.date <= end_date)
            .cloned()
            .collect())
    }

    fn data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TradesimError> {
        let min = self.quotes.iter().map(|q| q.date).min();
        let max = self.quotes.iter().map(|q| q.date).max();
        Ok(min.zip(max).map(|(min, max)| (min, max, self.quotes.len())))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_quote(date: &str, close: f64) -> DailyQuote {
    DailyQuote::new(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(), close)
}

/// The three-day series used throughout the scenario tests.
pub fn reference_quotes() -> Vec<DailyQuote> {
    vec![
        make_quote("2024-01-02", 70_000.0),
        make_quote("2024-01-03", 71_000.0),
        make_quote("2024-01-04", 69_500.0),
    ]
}

/// Consecutive calendar days from `start`, one per entry in `closes`.
pub fn generate_quotes(start: NaiveDate, closes: &[f64]) -> Vec<DailyQuote> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| DailyQuote::new(start + chrono::Duration::days(i as i64), close))
        .collect()
}

pub const REFERENCE_CSV: &str = "date,close,fx_rate,vix,etf_volume\n\
    2024-01-02,70000,1300.1,12.5,100000\n\
    2024-01-03,71000,1305.2,12.9,110000\n\
    2024-01-04,69500,1310.3,13.4,90000\n";
