//! JSON HTTP adapter.
//!
//! Exposes the trade simulation and the dashboard quote window over axum.

mod error;
mod handlers;

pub use error::{ErrorBody, WebError};
pub use handlers::*;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::ports::quote_port::QuoteSeriesProvider;

pub struct AppState {
    pub provider: Arc<dyn QuoteSeriesProvider + Send + Sync>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/simulation/trade", post(handlers::run_trade))
        .route("/api/simulation/quotes", get(handlers::quotes))
        .fallback(handlers::not_found)
        .with_state(Arc::new(state))
}
