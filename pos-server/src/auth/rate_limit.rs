//! Fixed-window request throttling for the public credential routes
//!
//! | Policy | Limit |
//! |--------|-------|
//! | [`LOGIN_POLICY`] | 5 / minute / IP |
//! | [`REGISTER_POLICY`] | 3 / minute / IP |

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::core::ServerState;
use crate::security_log;
use crate::{AppError, ErrorCode};

/// How many requests one client may make to a route per window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    pub route: &'static str,
    pub max_requests: u32,
    pub window: Duration,
}

pub const LOGIN_POLICY: RatePolicy = RatePolicy {
    route: "login",
    max_requests: 5,
    window: Duration::from_secs(60),
};

pub const REGISTER_POLICY: RatePolicy = RatePolicy {
    route: "register",
    max_requests: 3,
    window: Duration::from_secs(60),
};

/// Windows idle for longer than this are dropped by [`RateLimiter::cleanup`]
const STALE_AFTER: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy)]
struct Window {
    opened: Instant,
    hits: u32,
}

/// Shared counter table keyed by `(route, client)`
#[derive(Debug, Clone, Default)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<(&'static str, String), Window>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a hit; `false` once the client is over the policy's limit.
    pub async fn allow(&self, policy: &RatePolicy, client: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let window = windows
            .entry((policy.route, client.to_owned()))
            .or_insert(Window { opened: now, hits: 0 });

        if now.duration_since(window.opened) >= policy.window {
            *window = Window { opened: now, hits: 0 };
        }
        window.hits = window.hits.saturating_add(1);
        window.hits <= policy.max_requests
    }

    pub async fn cleanup(&self) {
        let now = Instant::now();
        self.windows
            .lock()
            .await
            .retain(|_, w| now.duration_since(w.opened) < STALE_AFTER);
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.windows.lock().await.len()
    }
}

/// Socket peer, or the leftmost X-Forwarded-For entry when the server sits
/// behind a trusted proxy. "unknown" when neither is available.
fn client_key(request: &Request, trust_proxy: bool) -> String {
    let forwarded = trust_proxy
        .then(|| request.headers().get("x-forwarded-for"))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    match forwarded {
        Some(ip) => ip.to_owned(),
        None => request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_owned()),
    }
}

async fn enforce(
    state: &ServerState,
    policy: &RatePolicy,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = client_key(&request, state.config.trust_proxy);
    if state.rate_limiter.allow(policy, &client).await {
        return Ok(next.run(request).await);
    }
    security_log!("WARN", "rate_limited", route = policy.route, ip = client);
    Err(AppError::new(ErrorCode::TooManyAttempts))
}

pub async fn login_rate_limit(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(&state, &LOGIN_POLICY, request, next).await
}

pub async fn register_rate_limit(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(&state, &REGISTER_POLICY, request, next).await
}
