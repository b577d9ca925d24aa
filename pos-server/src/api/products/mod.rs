//! Product API
//!
//! | Path | Method | Access |
//! |------|--------|--------|
//! | /api/products | GET | session |
//! | /api/products | POST | owner |
//! | /api/products/{id} | GET | session |
//! | /api/products/{id} | PUT, DELETE | owner |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_owner;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", routes())
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
