//! CSV file quote adapter.
//!
//! Reads a single series file with a `date,close` header plus optional
//! `fx_rate`, `vix` and `etf_volume` columns. Columns are matched by header
//! name; unknown columns are ignored.

use crate::domain::error::TradesimError;
use crate::domain::quote::DailyQuote;
use crate::domain::simulation::ValuationPoint;
use crate::ports::quote_port::QuoteSeriesProvider;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    close: f64,
    #[serde(default)]
    fx_rate: Option<f64>,
    #[serde(default)]
    vix: Option<f64>,
    #[serde(default)]
    etf_volume: Option<f64>,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Every quote in the file, in file order.
    pub fn read_all(&self) -> Result<Vec<DailyQuote>, TradesimError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| TradesimError::Database {
                reason: format!("failed to read {}: {}", self.path.display(), e),
            })?;

        let mut quotes = Vec::new();
        for (idx, result) in rdr.deserialize::<CsvRow>().enumerate() {
            // header is line 1
            let line = idx + 2;
            let row = result.map_err(|e| TradesimError::Database {
                reason: format!("{} line {}: {}", self.path.display(), line, e),
            })?;
            let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|e| {
                TradesimError::Database {
                    reason: format!(
                        "{} line {}: invalid date '{}': {}",
                        self.path.display(),
                        line,
                        row.date,
                        e
                    ),
                }
            })?;
            quotes.push(DailyQuote {
                date,
                close: row.close,
                fx_rate: row.fx_rate,
                vix: row.vix,
                etf_volume: row.etf_volume,
            });
        }
        Ok(quotes)
    }
}

impl QuoteSeriesProvider for CsvAdapter {
    fn fetch_quotes(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyQuote>, TradesimError> {
        let mut quotes = self.read_all()?;
        quotes.retain(|q| q.date >= start_date && q.date <= end_date);
        Ok(quotes)
    }

    fn data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TradesimError> {
        let quotes = self.read_all()?;
        let min = quotes.iter().map(|q| q.date).min();
        let max = quotes.iter().map(|q| q.date).max();
        Ok(min.zip(max).map(|(min, max)| (min, max, quotes.len())))
    }
}

/// Write a valuation trajectory as a `date,value` CSV.
pub fn write_trajectory<P: AsRef<Path>>(
    path: P,
    trajectory: &[ValuationPoint],
) -> Result<(), TradesimError> {
    let mut wtr = csv::Writer::from_path(path).map_err(std::io::Error::from)?;
    for point in trajectory {
        wtr.serialize(point).map_err(std::io::Error::from)?;
    }
    wtr.flush()?;
    Ok(())
}
