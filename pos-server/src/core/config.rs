use chrono_tz::Tz;

use super::ServerError;
use crate::auth::JwtConfig;

/// Default sentinel customer for walk-in sales (seeded by migration)
pub const DEFAULT_WALK_IN_CUSTOMER_ID: &str = "cust-seed-1";

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | ENVIRONMENT | development | development / staging / production |
/// | HTTP_PORT | 3000 | HTTP listen port |
/// | DATABASE_PATH | pos.db | SQLite database file |
/// | JWT_SECRET | dev placeholder | session signing key |
/// | SESSION_TTL_MINUTES | 480 | session lifetime |
/// | COOKIE_SECURE | true in production | `Secure` flag on the session cookie |
/// | APP_URL | http://localhost:3000 | base URL for emailed links |
/// | EMAIL_FROM | POS <noreply@example.com> | sender address |
/// | RESEND_API_KEY | - | when unset, reset links are only logged |
/// | OWNER_REGISTRATION_CODE | - | required code for OWNER sign-up |
/// | WALK_IN_CUSTOMER_ID | cust-seed-1 | walk-in customer sentinel |
/// | BUSINESS_TIMEZONE | UTC | IANA zone for report day boundaries |
/// | LOG_LEVEL / LOG_DIR / LOG_JSON | info / - / false | logging |
/// | SEED_DEMO_DATA | false | create demo users and catalog |
/// | TRUST_PROXY | false | key rate limits on X-Forwarded-For (only behind a proxy) |
#[derive(Debug, Clone)]
pub struct Config {
    /// development | staging | production
    pub environment: String,
    pub http_port: u16,
    pub database_path: String,
    pub jwt: JwtConfig,
    pub cookie_secure: bool,
    pub app_url: String,
    pub email_from: String,
    pub resend_api_key: Option<String>,
    pub owner_registration_code: Option<String>,
    pub walk_in_customer_id: String,
    pub business_timezone: Tz,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
    pub seed_demo_data: bool,
    /// Honour X-Forwarded-For when identifying clients
    pub trust_proxy: bool,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str) -> Result<String, ServerError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(ServerError::Config(format!(
                        "{name} must be set in {environment} environment"
                    )));
                }
                format!("dev-{name}-not-for-production-use-only")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(ServerError::Config(format!(
                "{name} must not be empty in {environment} environment"
            )));
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ServerError> {
        let environment = env_or("ENVIRONMENT", "development");
        let is_production = environment == "production";

        let secret = Self::require_secret("JWT_SECRET", &environment)?;
        if environment != "development" && secret.len() < 32 {
            return Err(ServerError::Config(
                "JWT_SECRET must be at least 32 characters long".into(),
            ));
        }

        let tz_name = env_or("BUSINESS_TIMEZONE", "UTC");
        let business_timezone: Tz = tz_name
            .parse()
            .map_err(|_| ServerError::Config(format!("Unknown BUSINESS_TIMEZONE: {tz_name}")))?;

        Ok(Self {
            http_port: env_parse("HTTP_PORT", 3000),
            database_path: env_or("DATABASE_PATH", "pos.db"),
            jwt: JwtConfig {
                secret,
                expiration_minutes: env_parse("SESSION_TTL_MINUTES", 480),
            },
            cookie_secure: env_parse("COOKIE_SECURE", is_production),
            app_url: env_or("APP_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            email_from: env_or("EMAIL_FROM", "POS <noreply@example.com>"),
            resend_api_key: env_opt("RESEND_API_KEY"),
            owner_registration_code: env_opt("OWNER_REGISTRATION_CODE"),
            walk_in_customer_id: env_or("WALK_IN_CUSTOMER_ID", DEFAULT_WALK_IN_CUSTOMER_ID),
            business_timezone,
            log_level: env_or("LOG_LEVEL", "info"),
            log_dir: env_opt("LOG_DIR"),
            log_json: env_parse("LOG_JSON", false),
            seed_demo_data: env_parse("SEED_DEMO_DATA", false),
            trust_proxy: env_parse("TRUST_PROXY", false),
            environment,
        })
    }

    /// Configuration for tests and embedding: development defaults with the
    /// given database path and signing secret, independent of the process env.
    pub fn for_database(database_path: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            environment: "development".into(),
            http_port: 0,
            database_path: database_path.into(),
            jwt: JwtConfig {
                secret: jwt_secret.into(),
                expiration_minutes: 480,
            },
            cookie_secure: false,
            app_url: "http://localhost:3000".into(),
            email_from: "POS <noreply@example.com>".into(),
            resend_api_key: None,
            owner_registration_code: None,
            walk_in_customer_id: DEFAULT_WALK_IN_CUSTOMER_ID.into(),
            business_timezone: Tz::UTC,
            log_level: "info".into(),
            log_dir: None,
            log_json: false,
            seed_demo_data: false,
            trust_proxy: false,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
