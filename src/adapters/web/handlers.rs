//! HTTP request handlers for the web adapter.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::Uri,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::error::{TradesimError, ValidationError};
use crate::domain::period::{self, Period, QuoteRow};
use crate::domain::simulation::{self, SimulationRequestBody, SimulationResult, parse_date};

use super::{AppState, WebError};

/// Run the synchronous engine off the async executor.
async fn blocking<T, F>(f: F) -> Result<T, WebError>
where
    F: FnOnce() -> Result<T, TradesimError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| WebError::internal(format!("simulation task failed: {}", e)))?
        .map_err(WebError::from)
}

pub async fn run_trade(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SimulationRequestBody>, JsonRejection>,
) -> Result<Json<SimulationResult>, WebError> {
    let Json(body) = body.map_err(|e| WebError::bad_request(e.body_text()))?;
    let request = body.into_request()?;
    tracing::info!(
        buy_date = %request.buy_date,
        sell_date = %request.sell_date,
        principal = request.principal,
        "trade simulation"
    );

    let provider = Arc::clone(&state.provider);
    let result = blocking(move || simulation::simulate(provider.as_ref(), &request)).await?;
    Ok(Json(result))
}

#[derive(Debug, Default, Deserialize)]
pub struct QuotesParams {
    pub to: Option<String>,
    pub from: Option<String>,
    pub unit: Option<String>,
}

pub async fn quotes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QuotesParams>,
) -> Result<Json<Vec<QuoteRow>>, WebError> {
    let to = params
        .to
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(ValidationError::MissingField("to"))?;
    let to = parse_date(to.trim(), "to")?;
    let from = match params.from.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => Some(parse_date(s, "from")?),
        _ => None,
    };
    let unit = Period::parse_or_default(
        params
            .unit
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or("10y"),
    );

    let provider = Arc::clone(&state.provider);
    let rows = blocking(move || period::fetch_window(provider.as_ref(), to, unit, from)).await?;
    Ok(Json(rows))
}

pub async fn not_found(uri: Uri) -> WebError {
    WebError::not_found(format!("no route for {}", uri.path()))
}
