//! Utilities - common helpers and error re-exports
//!
//! - [`AppError`] / [`ErrorBody`] from `shared::error`
//! - logging setup, input validation, business-timezone date math

pub mod logger;
pub mod time;
pub mod validation;

pub use shared::error::{AppError, AppResult, ErrorBody, ErrorCategory, ErrorCode};
