//! Route guard decision table
//!
//! Pure function of (path, access state). The middleware in
//! [`super::middleware`] applies it to every request.
//!
//! Evaluation order:
//! 1. public prefix → allow (authenticated + exactly `/login` or `/register`
//!    → role dispatch)
//! 2. anonymous → login (401 for `/api/…`)
//! 3. owner prefix and not OWNER → staff dashboard
//! 4. allow

use shared::models::UserRole;

use super::CurrentUser;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const POST_LOGIN_PATH: &str = "/auth/post-login";
pub const OWNER_HOME: &str = "/owner";
pub const STAFF_HOME: &str = "/staff";

/// Reachable without a session
pub const PUBLIC_PREFIXES: &[&str] = &[
    LOGIN_PATH,
    REGISTER_PATH,
    "/forgot-password",
    "/reset-password",
    "/api/register",
    "/api/auth",
    "/static",
    "/favicon.ico",
    "/health",
];

/// Reachable only by OWNER sessions
pub const OWNER_PREFIXES: &[&str] = &[OWNER_HOME, "/products", "/reports"];

/// Access state of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    Anonymous,
    AuthenticatedStaff,
    AuthenticatedOwner,
}

impl AccessState {
    pub fn from_session(user: Option<&CurrentUser>) -> Self {
        match user.map(|u| u.role) {
            None => Self::Anonymous,
            Some(UserRole::Owner) => Self::AuthenticatedOwner,
            Some(UserRole::Staff) => Self::AuthenticatedStaff,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }
}

/// Guard verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
    /// API request without a session
    Unauthorized,
}

/// `path` equals `prefix` or continues with a new segment.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn is_api(path: &str) -> bool {
    matches_prefix(path, "/api")
}

pub fn is_public(path: &str) -> bool {
    PUBLIC_PREFIXES.iter().any(|p| matches_prefix(path, p))
}

pub fn is_owner_only(path: &str) -> bool {
    OWNER_PREFIXES.iter().any(|p| matches_prefix(path, p))
}

/// Landing page for a role (role dispatch endpoint)
pub fn landing_for(role: UserRole) -> &'static str {
    match role {
        UserRole::Owner => OWNER_HOME,
        UserRole::Staff => STAFF_HOME,
    }
}

/// Decide what happens to a request for `path` in `state`.
pub fn decide(path: &str, state: AccessState) -> GuardDecision {
    if is_public(path) {
        if state.is_authenticated() && (path == LOGIN_PATH || path == REGISTER_PATH) {
            return GuardDecision::Redirect(POST_LOGIN_PATH);
        }
        return GuardDecision::Allow;
    }

    if !state.is_authenticated() {
        return if is_api(path) {
            GuardDecision::Unauthorized
        } else {
            GuardDecision::Redirect(LOGIN_PATH)
        };
    }

    if is_owner_only(path) && state != AccessState::AuthenticatedOwner {
        return GuardDecision::Redirect(STAFF_HOME);
    }

    GuardDecision::Allow
}

#[cfg(test)]
mod tests {
    use super::AccessState::*;
    use super::GuardDecision::*;
    use super::*;

    #[test]
    fn public_paths_are_open_to_anonymous() {
        for path in [
            "/login",
            "/register",
            "/forgot-password",
            "/reset-password",
            "/api/register",
            "/api/auth/login",
            "/api/auth/forgot",
            "/static/app.css",
            "/favicon.ico",
            "/health",
        ] {
            assert_eq!(decide(path, Anonymous), Allow, "{path}");
        }
    }

    #[test]
    fn authenticated_users_are_bounced_from_login_and_register() {
        assert_eq!(decide("/login", AuthenticatedStaff), Redirect(POST_LOGIN_PATH));
        assert_eq!(decide("/register", AuthenticatedOwner), Redirect(POST_LOGIN_PATH));
        // only the exact pages, not the rest of the public space
        assert_eq!(decide("/api/register", AuthenticatedOwner), Allow);
        assert_eq!(decide("/login/help", AuthenticatedStaff), Allow);
        assert_eq!(decide("/api/auth/status", AuthenticatedStaff), Allow);
    }

    #[test]
    fn anonymous_is_sent_to_login() {
        assert_eq!(decide("/staff", Anonymous), Redirect(LOGIN_PATH));
        assert_eq!(decide("/owner", Anonymous), Redirect(LOGIN_PATH));
        assert_eq!(decide("/", Anonymous), Redirect(LOGIN_PATH));
        assert_eq!(decide("/api/orders", Anonymous), Unauthorized);
    }

    #[test]
    fn staff_is_rerouted_from_owner_paths() {
        for path in ["/owner", "/owner/settings", "/products", "/products/new", "/reports"] {
            assert_eq!(decide(path, AuthenticatedStaff), Redirect(STAFF_HOME), "{path}");
            assert_eq!(decide(path, AuthenticatedOwner), Allow, "{path}");
        }
    }

    #[test]
    fn prefix_match_is_segment_aware() {
        assert_eq!(decide("/productsx", AuthenticatedStaff), Allow);
        assert_eq!(decide("/ownership", AuthenticatedStaff), Allow);
        assert_eq!(decide("/loginx", Anonymous), Redirect(LOGIN_PATH));
    }

    #[test]
    fn everything_else_is_allowed_with_a_session() {
        assert_eq!(decide("/staff", AuthenticatedStaff), Allow);
        assert_eq!(decide("/api/orders", AuthenticatedStaff), Allow);
        assert_eq!(decide("/api/products", AuthenticatedStaff), Allow);
    }

    #[test]
    fn role_dispatch() {
        assert_eq!(landing_for(UserRole::Owner), OWNER_HOME);
        assert_eq!(landing_for(UserRole::Staff), STAFF_HOME);
    }
}
