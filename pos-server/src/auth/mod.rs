//! Access control
//!
//! - [`JwtService`] - session token issuance and validation
//! - [`session`] - cookie / bearer transport
//! - [`guard`] - route guard decision table
//! - [`route_guard`] / [`require_owner`] - middleware
//! - [`password`] - Argon2 hashes and reset tokens
//! - [`RateLimiter`] - login / registration throttling

pub mod extractor;
pub mod guard;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod rate_limit;
pub mod session;

pub use guard::{AccessState, GuardDecision, landing_for};
pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_owner, route_guard};
pub use rate_limit::{RateLimiter, login_rate_limit, register_rate_limit};
