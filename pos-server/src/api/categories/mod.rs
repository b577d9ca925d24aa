//! Category API
//!
//! | Path | Method | Access |
//! |------|--------|--------|
//! | /api/categories | GET | session |
//! | /api/categories | POST | owner |
//! | /api/categories/{id} | GET | session |
//! | /api/categories/{id} | PUT, DELETE | owner |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_owner;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/categories", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route_layer(middleware::from_fn(require_owner));

    read_routes.merge(manage_routes)
}
