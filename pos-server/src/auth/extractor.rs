//! Session extractor
//!
//! Handlers take `CurrentUser` to require a session, or
//! `Option<CurrentUser>` when the session is optional.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;

use crate::AppError;
use crate::auth::session::{self, SessionLookup};
use crate::auth::{CurrentUser, JwtError};
use crate::core::ServerState;
use crate::security_log;

fn resolve(parts: &mut Parts, state: &ServerState) -> Result<Option<CurrentUser>, AppError> {
    // Already resolved by the route guard
    if let Some(user) = parts.extensions.get::<CurrentUser>() {
        return Ok(Some(user.clone()));
    }

    match session::lookup(&parts.headers, state.get_jwt_service()) {
        SessionLookup::Missing => Ok(None),
        SessionLookup::Valid(user) => {
            parts.extensions.insert(user.clone());
            Ok(Some(user))
        }
        SessionLookup::Rejected(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", parts.uri)
            );
            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid session")),
            }
        }
    }
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        match resolve(parts, state)? {
            Some(user) => Ok(user),
            None => {
                security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
                Err(AppError::unauthorized())
            }
        }
    }
}

impl OptionalFromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    /// Invalid or expired sessions count as anonymous here.
    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(resolve(parts, state).unwrap_or(None))
    }
}
