//! Authentication Handlers
//!
//! Identity resolution (login), session issue and teardown, role dispatch.

use std::time::Duration;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Redirect, Response},
};
use http::header::SET_COOKIE;
use serde::Serialize;
use shared::models::{AuthStatus, LoginRequest, LoginResponse, UserPublic};

use crate::auth::guard::{LOGIN_PATH, landing_for};
use crate::auth::password::{verify_password, verify_password_decoy};
use crate::auth::session::{clear_session_cookie, session_cookie};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use crate::utils::{AppError, AppResult};

/// Fixed delay before answering a login, found or not
const AUTH_FIXED_DELAY_MS: u64 = 300;

#[derive(Debug, Serialize)]
pub struct OkResponse {
    ok: bool,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    user: UserPublic,
}

/// POST /api/auth/login
///
/// Unknown user and wrong password produce the same 401.
pub async fn login(
    State(state): State<ServerState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Response> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let username = req.username.trim().to_lowercase();

    let found = if username.is_empty() || req.password.is_empty() {
        None
    } else {
        user::find_by_username(state.pool(), &username).await?
    };

    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let account = match found {
        Some(u) if verify_password(&req.password, &u.password_hash) => u,
        Some(_) => {
            security_log!("WARN", "login_failed", username = username, reason = "bad_password");
            return Err(AppError::invalid_credentials());
        }
        None => {
            verify_password_decoy(&req.password);
            security_log!("WARN", "login_failed", username = username, reason = "unknown_user");
            return Err(AppError::invalid_credentials());
        }
    };

    let jwt = state.get_jwt_service();
    let token = jwt
        .generate_token(&account.id, &account.username, account.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;
    let cookie = session_cookie(&token, jwt.ttl_seconds(), state.config.cookie_secure);

    security_log!(
        "INFO",
        "login_success",
        user_id = account.id.clone(),
        username = account.username.clone(),
        user_role = account.role.as_str()
    );

    let redirect_to = landing_for(account.role).to_string();
    let body = LoginResponse {
        token,
        user: UserPublic::from(account),
        redirect_to,
    };
    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

/// POST /api/auth/logout - clears the session cookie
pub async fn logout(
    State(state): State<ServerState>,
    user: Option<CurrentUser>,
) -> Response {
    if let Some(u) = &user {
        security_log!("INFO", "logout", user_id = u.id.clone(), username = u.username.clone());
    }
    (
        [(SET_COOKIE, clear_session_cookie(state.config.cookie_secure))],
        Json(OkResponse { ok: true }),
    )
        .into_response()
}

/// GET /logout - clears the session cookie and returns to the login page
pub async fn logout_page(State(state): State<ServerState>, user: Option<CurrentUser>) -> Response {
    if let Some(u) = &user {
        security_log!("INFO", "logout", user_id = u.id.clone(), username = u.username.clone());
    }
    (
        [(SET_COOKIE, clear_session_cookie(state.config.cookie_secure))],
        Redirect::to(LOGIN_PATH),
    )
        .into_response()
}

/// GET /api/auth/status - `{authenticated, user}`, never 401
pub async fn status(
    State(state): State<ServerState>,
    session: Option<CurrentUser>,
) -> AppResult<Json<AuthStatus>> {
    let user = match session {
        Some(s) => user::find_public(state.pool(), &s.id).await?,
        None => None,
    };
    Ok(Json(AuthStatus {
        authenticated: user.is_some(),
        user,
    }))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<ServerState>,
    session: CurrentUser,
) -> AppResult<Json<UserResponse>> {
    // token outlived its account
    let user = user::find_public(state.pool(), &session.id)
        .await?
        .ok_or_else(|| AppError::invalid_token("Invalid session"))?;
    Ok(Json(UserResponse { user }))
}

/// GET /auth/post-login - role dispatch
pub async fn post_login(session: CurrentUser) -> Redirect {
    Redirect::to(landing_for(session.role))
}
