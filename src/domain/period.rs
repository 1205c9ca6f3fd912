//! Dashboard chart windows.
//!
//! Maps a shorthand period code ("10y", "3m", ...) to the start of a quote
//! window ending on a given date, and shapes the quotes in that window into
//! chart rows.

use chrono::{Days, Months, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::{TradesimError, ValidationError};
use crate::domain::quote::DailyQuote;
use crate::ports::quote_port::QuoteSeriesProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    TenYears,
    FiveYears,
    OneYear,
    ThreeMonths,
    OneMonth,
    OneWeek,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::TenYears,
        Period::FiveYears,
        Period::OneYear,
        Period::ThreeMonths,
        Period::OneMonth,
        Period::OneWeek,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Period::TenYears => "10y",
            Period::FiveYears => "5y",
            Period::OneYear => "1y",
            Period::ThreeMonths => "3m",
            Period::OneMonth => "1m",
            Period::OneWeek => "1w",
        }
    }

    /// Lenient parse used by the dashboard: unknown codes mean one week.
    pub fn parse_or_default(code: &str) -> Period {
        code.parse().unwrap_or(Period::OneWeek)
    }

    /// First day of the window ending on `to`. Month arithmetic clamps to the
    /// last day of the target month.
    pub fn start_from(&self, to: NaiveDate) -> NaiveDate {
        let start = match self {
            Period::TenYears => to.checked_sub_months(Months::new(120)),
            Period::FiveYears => to.checked_sub_months(Months::new(60)),
            Period::OneYear => to.checked_sub_months(Months::new(12)),
            Period::ThreeMonths => to.checked_sub_months(Months::new(3)),
            Period::OneMonth => to.checked_sub_months(Months::new(1)),
            Period::OneWeek => to.checked_sub_days(Days::new(7)),
        };
        start.unwrap_or(NaiveDate::MIN)
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        Period::ALL
            .into_iter()
            .find(|p| p.code() == code)
            .ok_or_else(|| ValidationError::UnknownPeriod(s.to_string()))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Resolve the `[from, to]` window. An explicit `from` overrides the period.
pub fn resolve_window(
    to: NaiveDate,
    period: Period,
    from: Option<NaiveDate>,
) -> Result<(NaiveDate, NaiveDate), ValidationError> {
    let from = from.unwrap_or_else(|| period.start_from(to));
    if from > to {
        return Err(ValidationError::InvertedWindow { from, to });
    }
    Ok((from, to))
}

/// One chart row for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteRow {
    pub date: String,
    pub fx_rate: Option<f64>,
    pub vix: Option<f64>,
    pub etf_volume: Option<f64>,
    #[serde(rename = "gold_close")]
    pub close: f64,
    pub pred_close: Option<f64>,
}

impl From<&DailyQuote> for QuoteRow {
    fn from(q: &DailyQuote) -> Self {
        Self {
            date: q.date.format("%Y-%m-%d").to_string(),
            fx_rate: q.fx_rate,
            vix: q.vix,
            etf_volume: q.etf_volume,
            close: q.close,
            // no forecast series is stored yet
            pred_close: None,
        }
    }
}

/// Fetch the dashboard window ending on `to`, ascending by date. An empty
/// window is not an error here.
pub fn fetch_window(
    provider: &dyn QuoteSeriesProvider,
    to: NaiveDate,
    period: Period,
    from: Option<NaiveDate>,
) -> Result<Vec<QuoteRow>, TradesimError> {
    let (from, to) = resolve_window(to, period, from)?;
    let mut quotes = provider.fetch_quotes(from, to)?;
    quotes.sort_by_key(|q| q.date);
    tracing::debug!(%from, %to, rows = quotes.len(), "dashboard window");
    Ok(quotes.iter().map(QuoteRow::from).collect())
}
