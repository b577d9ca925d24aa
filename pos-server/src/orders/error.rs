//! Commit engine errors

use thiserror::Error;

use crate::db::repository::RepoError;
use crate::utils::{AppError, ErrorCode};

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Storage error: {0}")]
    Storage(#[from] RepoError),

    #[error("Order must contain at least one item")]
    Empty,

    #[error("customerId is required")]
    MissingCustomer,

    #[error("Unknown customer: {0}")]
    UnknownCustomer(String),

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Total mismatch: declared {declared}, computed {computed}")]
    TotalMismatch { declared: f64, computed: f64 },

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Order {id} was modified (expected version {expected}, found {actual})")]
    VersionConflict {
        id: String,
        expected: i64,
        actual: i64,
    },
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Storage(e) => e.into(),
            OrderError::Empty => AppError::new(ErrorCode::OrderEmpty),
            OrderError::MissingCustomer => {
                AppError::invalid_request("Invalid order payload: customerId is required")
                    .with_detail("field", "customerId")
            }
            OrderError::UnknownCustomer(id) => {
                AppError::validation(format!("Unknown customer: {id}"))
                    .with_detail("customerId", id)
            }
            OrderError::UnknownProduct(id) => AppError::with_message(
                ErrorCode::InvalidOrderItem,
                format!("Unknown product: {id}"),
            )
            .with_detail("productId", id),
            OrderError::TotalMismatch { declared, computed } => {
                AppError::new(ErrorCode::OrderTotalMismatch)
                    .with_detail("declared", declared)
                    .with_detail("computed", computed)
            }
            OrderError::NotFound(id) => {
                AppError::new(ErrorCode::OrderNotFound).with_detail("orderId", id)
            }
            OrderError::VersionConflict {
                id,
                expected,
                actual,
            } => AppError::new(ErrorCode::OrderVersionConflict)
                .with_detail("orderId", id)
                .with_detail("expectedVersion", expected)
                .with_detail("currentVersion", actual),
        }
    }
}
