//!
//! # Custom Error Handling
//!
//! Defines the application-wide error type `AppError` and its mapping onto
//! HTTP responses. Every domain error a handler can produce is recovered at
//! the request boundary by the `ResponseError` impl below; nothing is fatal
//! to the process.
//!
//! `From` implementations for `sqlx::Error`, `jsonwebtoken::errors::Error`,
//! and `bcrypt::BcryptError` let handlers bubble library failures up with `?`.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;

/// All error conditions the API distinguishes externally.
#[derive(Debug)]
pub enum AppError {
    /// Malformed, missing, or forbidden field on input (HTTP 400).
    /// Carries the list of violated constraints.
    Validation(String),
    /// Login failure (HTTP 400). Deliberately generic: it does not reveal
    /// whether the email exists or the password was wrong.
    InvalidCredentials,
    /// Missing, invalid, or revoked token (HTTP 401).
    Unauthorized(String),
    /// Entity absent, or present but owned by someone else (HTTP 404).
    /// The two cases are externally indistinguishable.
    NotFound(String),
    /// Failure in the storage layer (HTTP 500, detail logged, not leaked).
    Database(String),
    /// Any other unexpected failure (HTTP 500, detail logged, not leaked).
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
            AppError::InvalidCredentials => HttpResponse::BadRequest().json(json!({
                "error": "invalid email or password"
            })),
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(json!({
                "error": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "error": msg
            })),
            // 500s never leak the underlying message to the client.
            AppError::Database(msg) | AppError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "error": "internal server error"
                }))
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("record not found".into()),
            // The only unique constraint in the schema is users.email. A
            // concurrent registration can slip past the handler's pre-check
            // and hit the index; it must look like the pre-check's 400, not
            // a 500.
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Validation("email already in use".into())
            }
            _ => AppError::Database(error.to_string()),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(format!("invalid token: {}", error))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(error.to_string())
    }
}
