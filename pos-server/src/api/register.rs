//! Account registration
//!
//! | Path | Method | Access |
//! |------|--------|--------|
//! | /api/register | POST | public, 3/min per IP |

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    routing::post,
};
use serde::Serialize;
use shared::models::{RegisterRequest, UserCreate, UserRole};
use validator::ValidateEmail;

use crate::api::json_body;
use crate::auth::password::hash_password;
use crate::auth::register_rate_limit;
use crate::core::ServerState;
use crate::db::repository::{RepoError, user};
use crate::security_log;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_credential_len,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/register", post(register))
        .route_layer(middleware::from_fn_with_state(state.clone(), register_rate_limit))
}

#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    id: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    user: RegisteredUser,
}

/// Validated, normalized registration
fn validate(req: &RegisterRequest) -> AppResult<UserCreate> {
    let email = req.email.trim().to_lowercase();
    let username = req.username.trim().to_lowercase();
    let full_name = req.full_name.trim().to_string();
    let mobile_number = req.mobile_number.trim().to_string();
    let nic = req.nic.trim().to_string();

    if email.is_empty()
        || username.is_empty()
        || req.password.is_empty()
        || full_name.is_empty()
        || mobile_number.is_empty()
        || nic.is_empty()
    {
        return Err(AppError::validation("Missing required fields"));
    }

    validate_required_text(&email, "email", MAX_EMAIL_LEN)?;
    if !email.validate_email() {
        return Err(AppError::validation("Invalid email address").with_detail("field", "email"));
    }
    validate_credential_len(&username, "username")?;
    validate_credential_len(&req.password, "password")?;
    validate_required_text(&full_name, "fullName", MAX_NAME_LEN)?;
    validate_required_text(&mobile_number, "mobileNumber", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&nic, "nic", MAX_SHORT_TEXT_LEN)?;

    Ok(UserCreate {
        username,
        password_hash: String::new(),
        role: req.requested_role(),
        email,
        full_name,
        nic,
        mobile_number,
    })
}

/// POST /api/register
///
/// The role is fixed here for the life of the account.
pub async fn register(
    State(state): State<ServerState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let req = json_body(body, "Invalid registration payload")?;
    let mut data = validate(&req)?;

    if data.role == UserRole::Owner
        && let Some(expected) = &state.config.owner_registration_code
        && req.owner_code.as_deref().map(str::trim) != Some(expected.as_str())
    {
        security_log!("WARN", "owner_code_rejected", username = data.username.clone());
        return Err(AppError::new(ErrorCode::RegistrationCodeInvalid));
    }

    data.password_hash = hash_password(&req.password)?;

    let created = match user::create(state.pool(), data).await {
        Ok(u) => u,
        Err(RepoError::Duplicate(column)) if column == "username" => {
            return Err(AppError::new(ErrorCode::UsernameExists).with_detail("field", "username"));
        }
        Err(RepoError::Duplicate(column)) if column == "email" => {
            return Err(AppError::new(ErrorCode::EmailExists).with_detail("field", "email"));
        }
        Err(e) => return Err(e.into()),
    };

    security_log!(
        "INFO",
        "user_registered",
        user_id = created.id.clone(),
        username = created.username.clone(),
        user_role = created.role.as_str()
    );

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: RegisteredUser { id: created.id },
        }),
    ))
}
