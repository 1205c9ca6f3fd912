//! Daily quote representation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar date's observed market data.
///
/// `close` is the valuation price. The auxiliary series are carried through
/// for the dashboard but never read by the simulation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyQuote {
    pub date: NaiveDate,
    pub close: f64,
    #[serde(default)]
    pub fx_rate: Option<f64>,
    #[serde(default)]
    pub vix: Option<f64>,
    #[serde(default)]
    pub etf_volume: Option<f64>,
}

impl DailyQuote {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close,
            fx_rate: None,
            vix: None,
            etf_volume: None,
        }
    }

    /// A usable valuation price is finite and strictly positive.
    pub fn has_valid_close(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}
