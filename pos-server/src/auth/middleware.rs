//! Authentication middleware
//!
//! [`route_guard`] runs on every request: it resolves the session, stores
//! the [`CurrentUser`] in the request extensions and applies the
//! [`guard::decide`](super::guard::decide) verdict.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use http::header::SET_COOKIE;

use crate::AppError;
use crate::auth::guard::{self, AccessState, GuardDecision};
use crate::auth::session::{self, SessionLookup};
use crate::auth::{CurrentUser, JwtError};
use crate::core::ServerState;
use crate::security_log;

/// Route guard - session resolution + access decision
///
/// | Verdict | Response |
/// |---------|----------|
/// | Allow | handler runs |
/// | Redirect | 303 See Other |
/// | Unauthorized (`/api/…`) | 401 JSON |
///
/// A token that is present but invalid is treated as anonymous and the
/// stale cookie is cleared on the way out.
pub async fn route_guard(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Response {
    // CORS preflight
    if req.method() == http::Method::OPTIONS {
        return next.run(req).await;
    }

    let path = req.uri().path().to_string();
    let lookup = session::lookup(req.headers(), state.get_jwt_service());

    let (user, rejected) = match lookup {
        SessionLookup::Missing => (None, None),
        SessionLookup::Valid(user) => (Some(user), None),
        SessionLookup::Rejected(e) => {
            security_log!("WARN", "session_rejected", error = e.to_string(), uri = path.clone());
            (None, Some(e))
        }
    };

    let access = AccessState::from_session(user.as_ref());
    let decision = guard::decide(&path, access);

    let mut response = match decision {
        GuardDecision::Allow => {
            if let Some(user) = user {
                req.extensions_mut().insert(user);
            }
            next.run(req).await
        }
        GuardDecision::Redirect(to) => {
            tracing::debug!(path = %path, to = to, state = ?access, "Guard redirect");
            Redirect::to(to).into_response()
        }
        GuardDecision::Unauthorized => {
            security_log!("WARN", "auth_missing", uri = path.clone());
            match &rejected {
                Some(JwtError::ExpiredToken) => AppError::token_expired().into_response(),
                Some(_) => AppError::invalid_token("Invalid session").into_response(),
                None => AppError::unauthorized().into_response(),
            }
        }
    };

    if rejected.is_some()
        && let Ok(value) = session::clear_session_cookie(state.config.cookie_secure).parse()
    {
        response.headers_mut().append(SET_COOKIE, value);
    }

    response
}

/// Owner middleware - requires the OWNER role
///
/// Mounted on owner-only API routers after [`route_guard`].
///
/// # Errors
///
/// - no session: 401
/// - non-owner: 403 `OwnerRequired`
pub async fn require_owner(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::unauthorized)?;
    if !user.is_owner() {
        security_log!(
            "WARN",
            "owner_required",
            user_id = user.id.clone(),
            username = user.username.clone(),
            user_role = user.role.as_str()
        );
        return Err(AppError::new(shared::ErrorCode::OwnerRequired));
    }

    Ok(next.run(req).await)
}
