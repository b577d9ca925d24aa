//! HTML page shells
//!
//! Access is decided by the route guard; these handlers only return a
//! minimal document for the client bundle to mount on.

use axum::{
    Router,
    extract::Path,
    response::{Html, Redirect},
    routing::get,
};

use crate::auth::guard::POST_LOGIN_PATH;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(root))
        .route("/login", get(|| page("Sign in", "login")))
        .route("/register", get(|| page("Create account", "register")))
        .route("/forgot-password", get(|| page("Forgot password", "forgot-password")))
        .route("/reset-password", get(|| page("Reset password", "reset-password")))
        .route("/reset-password/{token}", get(reset_with_token))
        .route("/owner", get(|| page("Owner dashboard", "owner")))
        .route("/staff", get(|| page("Staff dashboard", "staff")))
        .route("/pos", get(|| page("Checkout", "pos")))
        .route("/orders", get(|| page("Orders", "orders")))
        .route("/receipt/{order_id}", get(|| page("Receipt", "receipt")))
        .route("/products", get(|| page("Products", "products")))
        .route("/reports", get(|| page("Reports", "reports")))
}

async fn root() -> Redirect {
    Redirect::to(POST_LOGIN_PATH)
}

/// Legacy path form of the emailed link
async fn reset_with_token(Path(token): Path<String>) -> Redirect {
    let token: String = token.chars().filter(char::is_ascii_hexdigit).collect();
    Redirect::to(&format!("/reset-password?token={token}"))
}

async fn page(title: &'static str, view: &'static str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n\
         <html lang=\"en\">\n\
         <head><meta charset=\"utf-8\"><meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title} · POS</title></head>\n\
         <body><div id=\"app\" data-view=\"{view}\"></div>\
         <script type=\"module\" src=\"/static/app.js\"></script></body>\n\
         </html>\n"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shell_names_its_view() {
        let Html(body) = page("Reports", "reports").await;
        assert!(body.contains("data-view=\"reports\""));
        assert!(body.contains("<title>Reports · POS</title>"));
    }
}
