//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used by every request handler.
//! It centralizes error management, providing a consistent way to turn validation
//! failures, missing records and store faults into HTTP responses.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so handlers can return
//! `Result<impl Responder, AppError>` and let Actix Web render the JSON error body.
//! Store faults never leak their cause to the client: the handler picks a generic
//! message and the cause is written to the log instead.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use log::error;
use serde_json::json;
use std::fmt::Display;
use thiserror::Error;
use validator::ValidationErrors;

/// Represents all possible errors that a request handler can produce.
///
/// Each variant corresponds to one row of the API's error taxonomy and carries the
/// message (or field-level detail) rendered into the response body.
#[derive(Debug, Error)]
pub enum AppError {
    /// A request body failed schema validation (HTTP 400).
    /// The field-level errors are returned under `details`.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The request body was not valid JSON or did not match the expected types (HTTP 400).
    #[error("Invalid JSON body: {0}")]
    MalformedBody(String),
    /// A client-side error such as a malformed path identifier (HTTP 400).
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// The request would break a uniqueness rule, e.g. a duplicate email (HTTP 400).
    #[error("Conflict: {0}")]
    Conflict(String),
    /// The requested resource does not exist (HTTP 404).
    #[error("Not Found: {0}")]
    NotFound(String),
    /// Anything else, including store connectivity failures (HTTP 500).
    /// The message is generic and safe to show to clients.
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl AppError {
    /// Logs `cause` and returns a 500 carrying only the client-facing `message`.
    pub fn internal(message: &str, cause: impl Display) -> Self {
        error!("{}: {}", message, cause);
        AppError::InternalServerError(message.to_string())
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// All bodies share the `{"error": ...}` shape; validation and JSON parse failures
/// add a `details` member.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::MalformedBody(_)
            | AppError::BadRequest(_)
            | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(errors) => json!({
                "error": "Validation failed",
                "details": errors
            }),
            AppError::MalformedBody(msg) => json!({
                "error": "Invalid JSON body",
                "details": msg
            }),
            AppError::BadRequest(msg)
            | AppError::Conflict(msg)
            | AppError::NotFound(msg)
            | AppError::InternalServerError(msg) => json!({
                "error": msg
            }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Errors raised while running a CPU-bound job on the blocking pool surface as 500s.
impl From<actix_web::error::BlockingError> for AppError {
    fn from(error: actix_web::error::BlockingError) -> AppError {
        AppError::internal("Background job failed", error)
    }
}
