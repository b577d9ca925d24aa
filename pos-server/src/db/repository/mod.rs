//! Repository Module
//!
//! Free functions over a `&SqlitePool` (or an open transaction), one
//! module per table.

pub mod category;
pub mod customer;
pub mod order;
pub mod product;
pub mod report;
pub mod user;

use thiserror::Error;

use crate::utils::{AppError, ErrorCode};

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// UNIQUE violation; carries the offending column
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Row is still referenced elsewhere
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                // "UNIQUE constraint failed: users.username"
                let column = db_err
                    .message()
                    .rsplit_once('.')
                    .map(|(_, col)| col.trim().to_string())
                    .unwrap_or_default();
                return RepoError::Duplicate(column);
            }
            if db_err.is_foreign_key_violation() {
                return RepoError::Conflict(db_err.message().to_string());
            }
        }
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(column) => {
                AppError::conflict(format!("{column} already exists")).with_detail("field", column)
            }
            RepoError::Conflict(msg) => AppError::conflict(msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Database operation failed");
                AppError::new(ErrorCode::InternalError)
            }
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Escape `%`, `_` and `\` for a `LIKE … ESCAPE '\'` pattern and wrap it in `%…%`.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
