//! Order API
//!
//! | Path | Method | Access |
//! |------|--------|--------|
//! | /api/orders | GET, POST | session |
//! | /api/orders/{id} | GET, PUT, DELETE | session |
//! | /api/orders/{id}/receipt | GET | session |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/receipt", get(handler::receipt))
}
