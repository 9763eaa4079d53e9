//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every core operation returns `Result<_, AppError>`, so the kind of failure
//! (bad input, missing or bad credentials, absent resource, storage trouble) travels
//! with the error up to the HTTP layer.
//!
//! `AppError` implements `actix_web::error::ResponseError`, which maps each kind onto a
//! status code and a `{"success": false, "error": ...}` JSON body. Internal details are
//! logged server-side and never written into the response.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Message returned to clients for any internal failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred. Please try again.";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing or malformed input that the client can fix (HTTP 400).
    ValidationFailed(String),
    /// No credentials, or credentials that are not a bearer token (HTTP 401).
    /// Also used for a failed login.
    Unauthenticated(String),
    /// A correctly signed session token whose lifetime has elapsed (HTTP 401).
    TokenExpired,
    /// A session token with a bad signature or structure (HTTP 403).
    Forbidden(String),
    /// The resource is absent or not owned by the caller (HTTP 404).
    /// Ownership is never distinguished from absence.
    NotFound(String),
    /// The request collides with existing state, e.g. a duplicate email (HTTP 409).
    Conflict(String),
    /// Storage, hashing or signing failure (HTTP 500).
    /// The payload is for the server log only.
    Internal(String),
}

impl AppError {
    /// Shorthand for the ownership-masked task lookup failure.
    pub fn task_not_found() -> Self {
        AppError::NotFound("Task not found.".into())
    }

    /// The message that is safe to show to the caller.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationFailed(msg)
            | AppError::Unauthenticated(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::TokenExpired => "Token has expired. Please log in again.".into(),
            AppError::Internal(_) => INTERNAL_ERROR_MESSAGE.into(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::ValidationFailed(msg) => write!(f, "Validation Failed: {}", msg),
            AppError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            AppError::TokenExpired => write!(f, "Token Expired"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) | AppError::TokenExpired => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = self {
            log::error!("internal error: {}", detail);
        }
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": self.public_message()
        }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`, a unique-index violation becomes `Conflict`,
/// everything else is an internal storage failure.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found.".into()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("Record already exists.".into())
            }
            _ => AppError::Internal(format!("storage: {}", error)),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationFailed`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationFailed(error.to_string())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::Internal`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("password hashing: {}", error))
    }
}
