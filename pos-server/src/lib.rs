//! POS Server - retail point-of-sale backend
//!
//! # Architecture
//!
//! - **Order Commit Engine** (`orders`): cart normalization, server-side
//!   totals, transactional create / replace / delete
//! - **Customer Resolver** (`customers`): phone-keyed find-or-create with
//!   a walk-in fallback
//! - **Access control** (`auth`): credential check, session tokens, route
//!   guard, role dispatch
//! - **HTTP API** (`api`): axum routers
//! - **Database** (`db`): SQLite via sqlx
//!
//! ```text
//! pos-server/src/
//! ├── core/          # config, state, server, startup errors
//! ├── auth/          # sessions, guard, passwords, rate limiting
//! ├── api/           # HTTP routes and handlers
//! ├── orders/        # order commit engine
//! ├── customers/     # customer resolver
//! ├── db/            # pool, migrations, repositories, seed data
//! ├── email/         # transactional email
//! ├── receipt.rs     # plain-text receipts
//! └── utils/         # logging, validation, time
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod customers;
pub mod db;
pub mod email;
pub mod orders;
pub mod receipt;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState, build_router};
pub use customers::CustomerResolver;
pub use orders::OrderCommitEngine;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ErrorBody, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

// Security logging macro (target "security")
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Start logging. The returned guard flushes file logs on drop.
pub fn setup_environment(
    config: &Config,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.log_dir.as_deref(),
    )
}

pub fn print_banner() {
    println!(
        r#"
    ____  ____  _____
   / __ \/ __ \/ ___/
  / /_/ / / / /\__ \
 / ____/ /_/ /___/ /
/_/    \____//____/
    "#
    );
}
