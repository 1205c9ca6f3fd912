//! HTTP error responses for the web adapter.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::domain::error::{TradesimError, ValidationError};

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub kind: &'a str,
    pub message: &'a str,
}

impl WebError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }
}

pub fn status_from_error(err: &TradesimError) -> StatusCode {
    match err {
        TradesimError::Validation(_) => StatusCode::BAD_REQUEST,
        TradesimError::NoData { .. } => StatusCode::NOT_FOUND,
        TradesimError::MissingQuote { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TradesimError::DataIntegrity { .. }
        | TradesimError::Database { .. }
        | TradesimError::DatabaseQuery { .. }
        | TradesimError::ConfigParse { .. }
        | TradesimError::ConfigMissing { .. }
        | TradesimError::ConfigInvalid { .. }
        | TradesimError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<TradesimError> for WebError {
    fn from(err: TradesimError) -> Self {
        let status = status_from_error(&err);
        if status.is_server_error() {
            tracing::error!(error = %err, "simulation request failed");
        }
        Self::new(status, err.kind(), err.to_string())
    }
}

impl From<ValidationError> for WebError {
    fn from(err: ValidationError) -> Self {
        TradesimError::from(err).into()
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            kind: self.kind,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
