/*!
 * Error handling module.
 *
 * Every fallible operation in the crate returns [`AppResult`]. Errors are
 * converted into HTTP responses in one place so handlers never build status
 * codes by hand: validation and uniqueness conflicts are client errors (400),
 * missing rows are 404, anything unexpected from the store is a 500 carrying
 * the raw error description.
 */

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result alias used throughout the application.
pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// Unexpected database failure (connection, syntax, a constraint other
    /// than uniqueness).
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Migration failure at startup.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Malformed or missing input. Carries the first violated rule's
    /// message, not an aggregate.
    #[error("{0}")]
    Validation(String),

    /// A unique constraint was violated, in practice the user email.
    #[error("{0}")]
    Conflict(String),

    /// The referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Environment or startup configuration problem.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anything else.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    /// Classifies store errors at the conversion boundary: a unique-index
    /// violation becomes [`Conflict`](AppError::Conflict), so a single
    /// constrained INSERT/UPDATE is the only uniqueness check performed.
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return AppError::Conflict("Email already in use.".to_string());
            }
        }
        AppError::Database(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Invalid request"),
            AppError::Conflict(_) => (StatusCode::BAD_REQUEST, "Conflict"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Resource not found"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        let body = Json(json!({
            "error": error_message,
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}
