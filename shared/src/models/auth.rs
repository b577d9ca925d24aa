//! Auth DTOs (login, session status, registration, password reset)

use serde::{Deserialize, Serialize};

use super::{UserPublic, UserRole};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Login result. The token is also set as the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserPublic,
    /// Landing page for the user's role
    pub redirect_to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub user: Option<UserPublic>,
}

/// `POST /api/register`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub nic: String,
    /// OWNER only when exactly `"OWNER"`
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub owner_code: Option<String>,
}

impl RegisterRequest {
    pub fn requested_role(&self) -> UserRole {
        match self.role.as_deref() {
            Some("OWNER") => UserRole::Owner,
            _ => UserRole::Staff,
        }
    }
}

/// `POST /api/auth/forgot` (`identifier`) and `/request-reset` (`email`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}
