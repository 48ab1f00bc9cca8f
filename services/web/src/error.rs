//! services/web/src/error.rs
//!
//! Defines the error types for the web service: `ApiError` for startup and
//! `PageError` for request handlers.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use gemara_chain_core::ports::PortError;
use serde::Serialize;
use tracing::error;

/// The primary error type for the `web` service binary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure to apply the schema migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Body of every error response.
#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Errors surfaced by page handlers.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// Invalid form input. The page re-renders the form with this message.
    #[error("{0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Page only reachable when logged in: send the browser to the login form.
    #[error("Login required")]
    LoginRequired,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type PageResult<T> = Result<T, PageError>;

impl PageError {
    pub fn validation(message: impl Into<String>) -> Self {
        PageError::Validation(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            PageError::Validation(_) => StatusCode::BAD_REQUEST,
            PageError::Unauthorized | PageError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            PageError::LoginRequired => StatusCode::SEE_OTHER,
            PageError::Forbidden => StatusCode::FORBIDDEN,
            PageError::NotFound => StatusCode::NOT_FOUND,
            PageError::Conflict(_) => StatusCode::CONFLICT,
            PageError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PortError> for PageError {
    fn from(e: PortError) -> Self {
        match e {
            PortError::NotFound(_) => PageError::NotFound,
            PortError::Conflict(message) => PageError::Conflict(message),
            PortError::Unauthorized => PageError::Unauthorized,
            PortError::Unexpected(message) => PageError::Internal(message),
        }
    }
}

/// Keeps the first failed rule, prefixed with its field.
impl From<garde::Report> for PageError {
    fn from(report: garde::Report) -> Self {
        let message = report
            .iter()
            .next()
            .map(|(path, error)| match path.to_string() {
                field if field.is_empty() => error.to_string(),
                field => format!("{}: {}", field, error),
            })
            .unwrap_or_else(|| "Invalid form".to_string());
        PageError::Validation(message)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::LoginRequired => Redirect::to("/login/").into_response(),
            PageError::Internal(ref message) => {
                error!("Request failed: {}", message);
                let body = ErrorBody {
                    error: "An internal error occurred".to_string(),
                };
                (self.status(), Json(body)).into_response()
            }
            other => {
                let body = ErrorBody {
                    error: other.to_string(),
                };
                (other.status(), Json(body)).into_response()
            }
        }
    }
}
