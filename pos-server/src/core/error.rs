//! Startup and lifecycle errors
//!
//! Request-level failures use [`shared::error::AppError`]; this type only
//! covers what can stop the process.

use thiserror::Error;

use crate::utils::AppError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] AppError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
