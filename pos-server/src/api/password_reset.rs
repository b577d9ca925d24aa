//! Password reset
//!
//! | Path | Method | Access |
//! |------|--------|--------|
//! | /api/auth/forgot | POST | public |
//! | /api/auth/request-reset | POST | public (email only) |
//! | /api/auth/reset | POST | public |
//!
//! The request endpoints answer `{ok: true}` whether or not the account
//! exists. Only the SHA-256 of a reset token is stored.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::Serialize;
use shared::models::{ForgotPasswordRequest, ResetPasswordRequest};

use crate::api::json_body;
use crate::auth::password::{generate_reset_token, hash_password, hash_token};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::email::password_reset_email;
use crate::security_log;
use crate::utils::validation::{non_blank, validate_credential_len};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Reset token lifetime
pub const RESET_TOKEN_TTL_MINUTES: i64 = 30;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/forgot", post(forgot))
        .route("/api/auth/request-reset", post(request_reset))
        .route("/api/auth/reset", post(reset))
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    ok: bool,
}

const OK: Json<OkResponse> = Json(OkResponse { ok: true });

/// POST /api/auth/forgot - `{identifier}` is an email or a username
pub async fn forgot(
    State(state): State<ServerState>,
    body: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> AppResult<Json<OkResponse>> {
    let req = json_body(body, "Username or email required")?;
    let identifier = non_blank(req.identifier.as_deref().or(req.email.as_deref()))
        .ok_or_else(|| AppError::validation("Username or email required"))?;
    start_reset(&state, &identifier).await?;
    Ok(OK)
}

/// POST /api/auth/request-reset - `{email}`
pub async fn request_reset(
    State(state): State<ServerState>,
    body: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> AppResult<Json<OkResponse>> {
    let req = json_body(body, "Email required")?;
    let email = non_blank(req.email.as_deref())
        .ok_or_else(|| AppError::validation("Email required"))?;
    start_reset(&state, &email).await?;
    Ok(OK)
}

/// Issue a token and mail the link when the account exists.
async fn start_reset(state: &ServerState, identifier: &str) -> AppResult<()> {
    let Some(account) = user::find_by_identifier(state.pool(), identifier).await? else {
        security_log!("INFO", "reset_requested", outcome = "unknown_account");
        return Ok(());
    };

    let token = generate_reset_token();
    let expires_at = shared::util::now_millis() + RESET_TOKEN_TTL_MINUTES * 60 * 1000;
    user::set_reset_token(state.pool(), &account.id, &hash_token(&token), expires_at).await?;

    let href = format!("{}/reset-password?token={}", state.config.app_url, token);
    let display_name = if account.full_name.is_empty() {
        account.username.as_str()
    } else {
        account.full_name.as_str()
    };
    let email = password_reset_email(&account.email, display_name, &href);

    if let Err(e) = state.mailer.send(email).await {
        tracing::error!(user_id = %account.id, error = %e, "Failed to send password reset email");
    }

    security_log!("INFO", "reset_requested", user_id = account.id.clone(), outcome = "token_issued");
    Ok(())
}

/// POST /api/auth/reset - `{token, password}`; a token works once
pub async fn reset(
    State(state): State<ServerState>,
    body: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> AppResult<Json<OkResponse>> {
    let req = json_body(body, "Missing token or password")?;
    let (Some(token), Some(password)) = (non_blank(req.token.as_deref()), req.password) else {
        return Err(AppError::validation("Missing token or password"));
    };
    if password.is_empty() {
        return Err(AppError::validation("Missing token or password"));
    }
    validate_credential_len(&password, "password")?;

    let password_hash = hash_password(&password)?;
    let now = shared::util::now_millis();
    if !user::consume_reset_token(state.pool(), &hash_token(&token), now, &password_hash).await? {
        security_log!("WARN", "reset_rejected", reason = "invalid_or_expired");
        return Err(AppError::new(ErrorCode::ResetTokenInvalid));
    }

    security_log!("INFO", "password_reset", outcome = "success");
    Ok(OK)
}
