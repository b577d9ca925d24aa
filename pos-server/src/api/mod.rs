//! HTTP API
//!
//! Each module exposes a `router()` merged by [`crate::core::build_app`].
//!
//! | Module | Prefix | Access |
//! |--------|--------|--------|
//! | health | /health | public |
//! | auth | /api/auth, /auth/post-login, /logout | public / session |
//! | register | /api/register | public |
//! | password_reset | /api/auth/forgot, /request-reset, /reset | public |
//! | orders | /api/orders | session |
//! | customers | /api/customers | session |
//! | categories | /api/categories | session (mutations: owner) |
//! | products | /api/products | session (mutations: owner) |
//! | reports | /api/reports | owner |
//! | pages | HTML shells | guard table |

pub mod auth;
pub mod categories;
pub mod customers;
pub mod health;
pub mod orders;
pub mod pages;
pub mod password_reset;
pub mod products;
pub mod register;
pub mod reports;

use axum::Json;
use axum::extract::rejection::JsonRejection;

use crate::utils::{AppError, AppResult};

/// Unwrap a JSON body, turning a malformed body into a 400 with `message`.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>, message: &str) -> AppResult<T> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected request body");
            Err(AppError::invalid_request(message))
        }
    }
}
