//! Customer Resolver
//!
//! Maps `(fullName, phone, email?)` to a customer id. Phone is the durable
//! identity; name and email are contact details refreshed on every resolve.
//! No details at all resolves to the walk-in sentinel.

use shared::models::{Customer, CustomerInput};
use sqlx::SqlitePool;

use crate::db::repository::customer;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, non_blank, validate_optional_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

/// How a resolve call was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    WalkIn,
    Updated,
    Created,
}

#[derive(Clone, Debug)]
pub struct CustomerResolver {
    pool: SqlitePool,
    walk_in_id: String,
}

impl CustomerResolver {
    pub fn new(pool: SqlitePool, walk_in_id: impl Into<String>) -> Self {
        Self {
            pool,
            walk_in_id: walk_in_id.into(),
        }
    }

    pub fn walk_in_id(&self) -> &str {
        &self.walk_in_id
    }

    /// Resolve contact details to a customer.
    ///
    /// - name and phone both blank → walk-in sentinel (must already exist)
    /// - exactly one blank → `CustomerIncomplete`
    /// - phone known → name (and email, when given) overwritten
    /// - phone unknown → new customer
    pub async fn resolve(&self, input: &CustomerInput) -> AppResult<(Customer, Resolution)> {
        let full_name = non_blank(input.full_name.as_deref());
        let phone = non_blank(input.phone.as_deref());
        let email = non_blank(input.email.as_deref());

        let (full_name, phone) = match (full_name, phone) {
            (None, None) => return Ok((self.walk_in().await?, Resolution::WalkIn)),
            (Some(name), Some(phone)) => (name, phone),
            _ => {
                return Err(AppError::with_message(
                    ErrorCode::CustomerIncomplete,
                    "fullName and phone required",
                ));
            }
        };

        if full_name.len() > MAX_NAME_LEN {
            return Err(AppError::validation("fullName is too long").with_detail("field", "fullName"));
        }
        if phone.len() > MAX_SHORT_TEXT_LEN {
            return Err(AppError::validation("phone is too long").with_detail("field", "phone"));
        }
        validate_optional_text(&email, "email", MAX_EMAIL_LEN)?;

        match customer::find_first_by_phone(&self.pool, &phone).await? {
            Some(existing) => {
                let updated =
                    customer::update_contact(&self.pool, &existing.id, &full_name, email.as_deref())
                        .await?;
                tracing::debug!(customer_id = %updated.id, "Customer contact refreshed");
                Ok((updated, Resolution::Updated))
            }
            None => {
                let created =
                    customer::create(&self.pool, &full_name, &phone, email.as_deref()).await?;
                tracing::info!(customer_id = %created.id, "Customer created");
                Ok((created, Resolution::Created))
            }
        }
    }

    /// Resolve to an id only
    pub async fn resolve_id(&self, input: &CustomerInput) -> AppResult<String> {
        self.resolve(input).await.map(|(c, _)| c.id)
    }

    async fn walk_in(&self) -> AppResult<Customer> {
        customer::find_by_id(&self.pool, &self.walk_in_id)
            .await?
            .ok_or_else(|| {
                tracing::error!(walk_in_id = %self.walk_in_id, "Walk-in customer record is missing");
                AppError::internal("Walk-in customer is not configured")
            })
    }
}
