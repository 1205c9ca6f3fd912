//! Buy-and-hold trade simulation.
//!
//! Answers "what if `principal` had been invested at the close on
//! `buy_date` and sold at the close on `sell_date`?". The quantity bought at
//! entry is held unchanged through the trajectory.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::error::{Boundary, TradesimError, ValidationError};
use crate::domain::quote::DailyQuote;
use crate::ports::quote_port::QuoteSeriesProvider;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    pub buy_date: NaiveDate,
    pub sell_date: NaiveDate,
    pub principal: f64,
}

impl SimulationRequest {
    pub fn new(buy_date: NaiveDate, sell_date: NaiveDate, principal: f64) -> Self {
        Self {
            buy_date,
            sell_date,
            principal,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err(ValidationError::NonPositivePrincipal(self.principal));
        }
        if self.buy_date > self.sell_date {
            return Err(ValidationError::BuyAfterSell {
                buy: self.buy_date,
                sell: self.sell_date,
            });
        }
        Ok(())
    }
}

/// Wire form of [`SimulationRequest`]. Every field is optional so an absent
/// field surfaces as a [`ValidationError`] instead of a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequestBody {
    pub buy_date: Option<String>,
    pub sell_date: Option<String>,
    #[serde(alias = "buyAmount")]
    pub principal: Option<f64>,
}

impl SimulationRequestBody {
    pub fn into_request(self) -> Result<SimulationRequest, ValidationError> {
        let buy_date = parse_field(self.buy_date, "buyDate")?;
        let sell_date = parse_field(self.sell_date, "sellDate")?;
        let principal = self
            .principal
            .ok_or(ValidationError::MissingField("principal"))?;
        Ok(SimulationRequest::new(buy_date, sell_date, principal))
    }
}

fn parse_field(value: Option<String>, field: &'static str) -> Result<NaiveDate, ValidationError> {
    let value = value
        .filter(|s| !s.trim().is_empty())
        .ok_or(ValidationError::MissingField(field))?;
    parse_date(value.trim(), field)
}

/// Parse a `YYYY-MM-DD` date, naming `field` on failure.
pub fn parse_date(value: &str, field: &'static str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Holding value on one day of the simulated period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValuationPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub entry_price: f64,
    pub exit_price: f64,
    pub principal: f64,
    pub quantity_purchased: f64,
    pub final_value: f64,
    pub profit_loss: f64,
    pub yield_percent: f64,
    pub valuation_trajectory: Vec<ValuationPoint>,
}

/// Validate `request`, read its range from `provider` and run the simulation.
///
/// Validation happens before the provider is touched. Provider errors are
/// returned unchanged.
pub fn simulate(
    provider: &dyn QuoteSeriesProvider,
    request: &SimulationRequest,
) -> Result<SimulationResult, TradesimError> {
    request.validate()?;
    let quotes = provider.fetch_quotes(request.buy_date, request.sell_date)?;
    tracing::debug!(
        buy_date = %request.buy_date,
        sell_date = %request.sell_date,
        quotes = quotes.len(),
        "fetched quote series"
    );
    simulate_series(request, quotes)
}

/// Run the simulation against an already fetched quote series.
///
/// Quotes outside `[buy_date, sell_date]` are ignored and the remainder is
/// sorted by date, so the provider's ordering does not matter.
pub fn simulate_series(
    request: &SimulationRequest,
    mut quotes: Vec<DailyQuote>,
) -> Result<SimulationResult, TradesimError> {
    request.validate()?;

    quotes.retain(|q| q.date >= request.buy_date && q.date <= request.sell_date);
    if quotes.is_empty() {
        return Err(TradesimError::NoData {
            start: request.buy_date,
            end: request.sell_date,
        });
    }
    quotes.sort_by_key(|q| q.date);

    let entry = find_exact(&quotes, request.buy_date, Boundary::Entry)?;
    let exit = find_exact(&quotes, request.sell_date, Boundary::Exit)?;
    check_price(entry)?;
    check_price(exit)?;

    let entry_price = entry.close;
    let exit_price = exit.close;
    let principal = request.principal;

    let quantity_purchased = principal / entry_price;
    let final_value = quantity_purchased * exit_price;
    let profit_loss = final_value - principal;
    let yield_percent = (profit_loss / principal) * 100.0;

    let valuation_trajectory = quotes
        .iter()
        .map(|q| {
            if !q.has_valid_close() {
                tracing::warn!(
                    date = %q.date,
                    price = q.close,
                    "invalid close inside holding period"
                );
            }
            ValuationPoint {
                date: q.date,
                value: quantity_purchased * q.close,
            }
        })
        .collect();

    Ok(SimulationResult {
        entry_price,
        exit_price,
        principal,
        quantity_purchased,
        final_value,
        profit_loss,
        yield_percent,
        valuation_trajectory,
    })
}

/// Exact-date lookup in a date-sorted series. No nearest-date fallback.
fn find_exact(
    sorted: &[DailyQuote],
    date: NaiveDate,
    boundary: Boundary,
) -> Result<&DailyQuote, TradesimError> {
    let idx = sorted.partition_point(|q| q.date < date);
    match sorted.get(idx) {
        Some(q) if q.date == date => Ok(q),
        _ => {
            tracing::warn!(%date, %boundary, "no quote on boundary date");
            Err(TradesimError::MissingQuote { boundary, date })
        }
    }
}

fn check_price(quote: &DailyQuote) -> Result<(), TradesimError> {
    if quote.has_valid_close() {
        Ok(())
    } else {
        tracing::warn!(date = %quote.date, price = quote.close, "invalid close price");
        Err(TradesimError::DataIntegrity {
            date: quote.date,
            price: quote.close,
        })
    }
}
