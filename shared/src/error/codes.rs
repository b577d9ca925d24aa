//! Unified error codes for the POS server
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Account errors (registration, password reset)
//! - 4xxx: Order errors
//! - 5xxx: Customer errors
//! - 6xxx: Catalog errors (products, categories)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the frontend can switch
/// on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Too many attempts, try again later
    TooManyAttempts = 6,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Owner role required
    OwnerRequired = 2002,

    // ==================== 3xxx: Account ====================
    /// Username already taken
    UsernameExists = 3001,
    /// Email already registered
    EmailExists = 3002,
    /// Username or password violates length policy
    PasswordPolicy = 3003,
    /// Owner registration code missing or wrong
    RegistrationCodeInvalid = 3004,
    /// Reset token unknown, used or expired
    ResetTokenInvalid = 3005,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no items
    OrderEmpty = 4002,
    /// Submitted total does not match the line items
    OrderTotalMismatch = 4003,
    /// Order was modified by someone else
    OrderVersionConflict = 4004,
    /// Unknown payment method
    InvalidPaymentMethod = 4005,
    /// Unknown sale type
    InvalidSaleType = 4006,
    /// Line item price or quantity out of range
    InvalidOrderItem = 4007,

    // ==================== 5xxx: Customer ====================
    /// Name and phone must be given together
    CustomerIncomplete = 5002,

    // ==================== 6xxx: Catalog ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product is referenced by orders
    ProductInUse = 6002,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category name already exists
    CategoryNameExists = 6102,
    /// Category still has products
    CategoryHasProducts = 6103,
    /// Category id does not reference an existing category
    InvalidCategory = 6104,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default message for this error code
    pub fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::TooManyAttempts => "Too many requests, try again later",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Session has expired",
            ErrorCode::TokenInvalid => "Invalid session",

            // Permission
            ErrorCode::OwnerRequired => "Owner role required",

            // Account
            ErrorCode::UsernameExists => "Username already in use",
            ErrorCode::EmailExists => "Email already in use",
            ErrorCode::PasswordPolicy => "Username and password must be 8-10 characters",
            ErrorCode::RegistrationCodeInvalid => "Invalid owner registration code",
            ErrorCode::ResetTokenInvalid => "Invalid or expired token",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order has no items",
            ErrorCode::OrderTotalMismatch => "Order total does not match items",
            ErrorCode::OrderVersionConflict => "Order was modified by another user",
            ErrorCode::InvalidPaymentMethod => "Invalid payment method",
            ErrorCode::InvalidSaleType => "Invalid sale type",
            ErrorCode::InvalidOrderItem => "Invalid order item",

            // Customer
            ErrorCode::CustomerIncomplete => "Customer name and phone are both required",

            // Catalog
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInUse => "Product is used by existing orders",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryNameExists => "Category name already exists",
            ErrorCode::CategoryHasProducts => "Category has associated products",
            ErrorCode::InvalidCategory => "Invalid category",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::TooManyAttempts),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2002 => Ok(ErrorCode::OwnerRequired),

            // Account
            3001 => Ok(ErrorCode::UsernameExists),
            3002 => Ok(ErrorCode::EmailExists),
            3003 => Ok(ErrorCode::PasswordPolicy),
            3004 => Ok(ErrorCode::RegistrationCodeInvalid),
            3005 => Ok(ErrorCode::ResetTokenInvalid),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderEmpty),
            4003 => Ok(ErrorCode::OrderTotalMismatch),
            4004 => Ok(ErrorCode::OrderVersionConflict),
            4005 => Ok(ErrorCode::InvalidPaymentMethod),
            4006 => Ok(ErrorCode::InvalidSaleType),
            4007 => Ok(ErrorCode::InvalidOrderItem),

            // Customer
            5002 => Ok(ErrorCode::CustomerIncomplete),

            // Catalog
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInUse),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6102 => Ok(ErrorCode::CategoryNameExists),
            6103 => Ok(ErrorCode::CategoryHasProducts),
            6104 => Ok(ErrorCode::InvalidCategory),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values() {
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::OwnerRequired.code(), 2002);
        assert_eq!(ErrorCode::OrderEmpty.code(), 4002);
        assert_eq!(ErrorCode::CategoryHasProducts.code(), 6103);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_covers_every_code() {
        let codes = [
            ErrorCode::ValidationFailed,
            ErrorCode::TooManyAttempts,
            ErrorCode::TokenInvalid,
            ErrorCode::OwnerRequired,
            ErrorCode::ResetTokenInvalid,
            ErrorCode::OrderVersionConflict,
            ErrorCode::InvalidOrderItem,
            ErrorCode::CustomerIncomplete,
            ErrorCode::InvalidCategory,
            ErrorCode::DatabaseError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("0");
        assert!(result.is_err());

        let result: Result<ErrorCode, _> = serde_json::from_str("999");
        assert!(result.is_err());

        let result: Result<ErrorCode, _> = serde_json::from_str("10000");
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::OrderNotFound).unwrap(), "4001");
        let parsed: ErrorCode = serde_json::from_str("4003").unwrap();
        assert_eq!(parsed, ErrorCode::OrderTotalMismatch);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::TooManyAttempts), "6");
        assert_eq!(format!("{}", ErrorCode::OrderNotFound), "4001");
    }

    #[test]
    fn test_invalid_error_code_display() {
        let err = InvalidErrorCode(999);
        assert_eq!(format!("{}", err), "invalid error code: 999");
    }
}
