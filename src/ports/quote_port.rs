//! Quote series access port trait.

use crate::domain::error::TradesimError;
use crate::domain::quote::DailyQuote;
use chrono::NaiveDate;

/// Source of daily quotes.
///
/// `fetch_quotes` returns every stored quote with `start <= date <= end`, or
/// an empty vector when there are none. Ordering is not part of the contract.
pub trait QuoteSeriesProvider {
    fn fetch_quotes(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyQuote>, TradesimError>;

    /// Earliest date, latest date and number of stored quotes.
    fn data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TradesimError>;
}
