use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::auth::{JwtService, RateLimiter};
use crate::core::{Config, Result};
use crate::customers::CustomerResolver;
use crate::db::DbService;
use crate::email::{LogMailer, Mailer, ResendMailer};
use crate::orders::OrderCommitEngine;

/// Rate limiter sweep interval
const RATE_LIMIT_SWEEP: Duration = Duration::from_secs(300);

/// Server state - shared handles for every request
///
/// Cloning is cheap: every field is a pool handle or an `Arc`.
///
/// | Field | Type | Role |
/// |-------|------|------|
/// | config | Arc<Config> | immutable configuration |
/// | db | DbService | SQLite pool |
/// | jwt_service | Arc<JwtService> | session tokens |
/// | rate_limiter | RateLimiter | login / registration throttling |
/// | mailer | Arc<dyn Mailer> | password reset delivery |
/// | orders | OrderCommitEngine | order mutations and reads |
/// | customers | CustomerResolver | contact → customer id |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub db: DbService,
    pub jwt_service: Arc<JwtService>,
    pub rate_limiter: RateLimiter,
    pub mailer: Arc<dyn Mailer>,
    pub orders: OrderCommitEngine,
    pub customers: CustomerResolver,
}

impl ServerState {
    /// Assemble state from an opened database and a mailer
    pub fn new(config: Config, db: DbService, mailer: Arc<dyn Mailer>) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let orders = OrderCommitEngine::new(db.pool.clone());
        let customers = CustomerResolver::new(db.pool.clone(), config.walk_in_customer_id.clone());

        Self {
            config: Arc::new(config),
            db,
            jwt_service,
            rate_limiter: RateLimiter::new(),
            mailer,
            orders,
            customers,
        }
    }

    /// Open the database, seed demo data when enabled and pick a mailer.
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db = DbService::new(&config.database_path).await?;

        if config.seed_demo_data {
            crate::db::seed::seed_demo_data(&db.pool).await?;
        }

        let mailer: Arc<dyn Mailer> = match &config.resend_api_key {
            Some(key) => Arc::new(ResendMailer::new(key.clone(), config.email_from.clone())),
            None => {
                tracing::warn!("RESEND_API_KEY not set, password reset links will only be logged");
                Arc::new(LogMailer)
            }
        };

        Ok(Self::new(config.clone(), db, mailer))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }

    pub fn get_jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    /// Periodic sweep of stale rate limiter entries
    pub fn start_background_tasks(&self) {
        let limiter = self.rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(RATE_LIMIT_SWEEP);
            // first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                limiter.cleanup().await;
                tracing::debug!("Rate limiter entries swept");
            }
        });
    }
}
