//! Health check
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /health | GET | none |
//!
//! ```json
//! { "ok": true, "db": "up", "auth": "ok" }
//! ```

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    ok: bool,
    /// up | down
    db: &'static str,
    auth: &'static str,
    version: &'static str,
}

/// 200 when the database answers, 503 otherwise
pub async fn health(State(state): State<ServerState>) -> (StatusCode, Json<HealthResponse>) {
    let db_up = state.db.ping().await;
    if !db_up {
        tracing::error!("Health check: database is not responding");
    }

    let status = if db_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(HealthResponse {
            ok: db_up,
            db: if db_up { "up" } else { "down" },
            auth: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
