// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for the wheel and location endpoints

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// HTTP-facing error type
/// DOCUMENTATION: Every handler returns Result<_, ServiceError>
/// Each variant maps to an HTTP status code and a JSON error body
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("A spin is already in progress")]
    SpinInProgress,

    #[error("The wheel has no segments to spin")]
    EmptyWheel,

    #[error("Unauthorized access")]
    Unauthorized,
}

impl ServiceError {
    fn code(&self) -> (StatusCode, &'static str) {
        match self {
            ServiceError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            ServiceError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ServiceError::SpinInProgress => (StatusCode::CONFLICT, "SPIN_IN_PROGRESS"),
            ServiceError::EmptyWheel => (StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_WHEEL"),
            ServiceError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        }
    }
}

/// Convert ServiceError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_code) = self.code();

        let body = json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        self.code().0
    }
}

/// Failure of a single location provider attempt
/// DOCUMENTATION: Never surfaced to HTTP clients. The resolver turns each
/// variant into a waterfall decision (skip, fall through, or stop).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Provider credential is not configured
    #[error("Provider credential missing: {0}")]
    Configuration(String),

    /// Transport failure, non-2xx status, quota status or malformed body
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider answered but nothing survived the filters
    #[error("No usable match")]
    NoMatch,

    /// Blank restaurant name
    #[error("Invalid query: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for ResolveError {
    fn from(e: reqwest::Error) -> Self {
        ResolveError::ProviderUnavailable(format!("Request failed: {}", e.without_url()))
    }
}
