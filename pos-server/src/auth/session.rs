//! Session transport
//!
//! The session token travels as an `HttpOnly` cookie for browser pages and
//! may also be sent as `Authorization: Bearer` by API clients.

use http::HeaderMap;
use http::header::{AUTHORIZATION, COOKIE};

use super::{CurrentUser, JwtError, JwtService};

/// Session cookie name
pub const SESSION_COOKIE: &str = "pos_session";

/// Find the session token: bearer header first, then the session cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(JwtService::extract_from_header)
    {
        return Some(token);
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Outcome of looking for a session on a request
#[derive(Debug)]
pub enum SessionLookup {
    /// No token presented
    Missing,
    /// Token presented and valid
    Valid(CurrentUser),
    /// Token presented but expired, forged or malformed
    Rejected(JwtError),
}

/// Decode the session carried by `headers`, if any.
pub fn lookup(headers: &HeaderMap, jwt: &JwtService) -> SessionLookup {
    let Some(token) = token_from_headers(headers) else {
        return SessionLookup::Missing;
    };
    match jwt.validate_token(token).and_then(CurrentUser::try_from) {
        Ok(user) => SessionLookup::Valid(user),
        Err(e) => SessionLookup::Rejected(e),
    }
}

/// `Set-Cookie` value issuing a session
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value clearing the session (logout)
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn reads_token_from_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; pos_session=abc.def.ghi; lang=en"),
        );
        assert_eq!(token_from_headers(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("pos_session=cookie-token"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer header-token"));
        assert_eq!(token_from_headers(&headers), Some("header-token"));
    }

    #[test]
    fn empty_cookie_means_no_session() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("pos_session="));
        assert_eq!(token_from_headers(&headers), None);
        assert_eq!(token_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("tok", 3600, true);
        assert!(cookie.starts_with("pos_session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.ends_with("; Secure"));
        assert!(clear_session_cookie(false).contains("Max-Age=0"));
    }
}
