//! Authentication Routes
//!
//! | Path | Method | Access |
//! |------|--------|--------|
//! | /api/auth/login | POST | public, rate limited |
//! | /api/auth/logout | POST | public |
//! | /api/auth/status | GET | public |
//! | /api/auth/me | GET | session |
//! | /auth/post-login | GET | session (role dispatch) |
//! | /logout | GET | session |

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::login_rate_limit;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    let login = Router::new()
        .route("/api/auth/login", post(handler::login))
        .route_layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));

    Router::new()
        .merge(login)
        .route("/api/auth/logout", post(handler::logout))
        .route("/api/auth/status", get(handler::status))
        .route("/api/auth/me", get(handler::me))
        .route("/auth/post-login", get(handler::post_login))
        .route("/logout", get(handler::logout_page))
}
