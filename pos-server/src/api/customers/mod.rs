//! Customer API
//!
//! | Path | Method | Access |
//! |------|--------|--------|
//! | /api/customers | GET, POST | session |
//! | /api/customers/resolve | POST | session |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/customers", get(handler::list).post(handler::find_or_create))
        .route("/api/customers/resolve", post(handler::resolve))
}
