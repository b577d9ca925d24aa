//! Demo data
//!
//! Two accounts (`owner1` / `staff1`, password `staff123`), one category and
//! two products. Every step is skipped when its row already exists, so the
//! seed can run on every start.

use shared::models::{UserCreate, UserRole};
use sqlx::SqlitePool;

use super::repository::product::ProductFields;
use super::repository::{category, product, user};
use crate::auth::password::hash_password;
use crate::utils::AppResult;

pub const DEMO_PASSWORD: &str = "staff123";

struct DemoUser {
    username: &'static str,
    role: UserRole,
    full_name: &'static str,
    email: &'static str,
    nic: &'static str,
    mobile_number: &'static str,
}

const DEMO_USERS: [DemoUser; 2] = [
    DemoUser {
        username: "owner1",
        role: UserRole::Owner,
        full_name: "Owner User",
        email: "owner@test.com",
        nic: "901234567V",
        mobile_number: "0710000000",
    },
    DemoUser {
        username: "staff1",
        role: UserRole::Staff,
        full_name: "Staff User",
        email: "staff@test.com",
        nic: "911234567V",
        mobile_number: "0711111111",
    },
];

const DEMO_CATEGORY: &str = "Beverages";
const DEMO_PRODUCTS: [(&str, f64, &str); 2] = [("Coke", 150.0, "COKE001"), ("Pepsi", 140.0, "PEPSI001")];

pub async fn seed_demo_data(pool: &SqlitePool) -> AppResult<()> {
    let password_hash = hash_password(DEMO_PASSWORD)?;

    for demo in &DEMO_USERS {
        if user::find_by_username(pool, demo.username).await?.is_some() {
            continue;
        }
        user::create(
            pool,
            UserCreate {
                username: demo.username.to_string(),
                password_hash: password_hash.clone(),
                role: demo.role,
                email: demo.email.to_string(),
                full_name: demo.full_name.to_string(),
                nic: demo.nic.to_string(),
                mobile_number: demo.mobile_number.to_string(),
            },
        )
        .await?;
        tracing::info!(username = demo.username, role = %demo.role, "Seeded demo user");
    }

    let beverages = match category::find_by_name(pool, DEMO_CATEGORY).await? {
        Some(c) => c,
        None => category::create(pool, DEMO_CATEGORY).await?,
    };

    for (name, price, barcode) in DEMO_PRODUCTS {
        if product::find_by_barcode(pool, barcode).await?.is_some() {
            continue;
        }
        product::create(
            pool,
            ProductFields {
                name: name.to_string(),
                price,
                category_id: beverages.id.clone(),
                barcode: Some(barcode.to_string()),
                description: None,
                image_url: None,
            },
        )
        .await?;
    }

    tracing::info!("Demo data ready (login: staff1 / {DEMO_PASSWORD})");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn seeding_twice_is_harmless() {
        let db = DbService::in_memory().await.unwrap();
        seed_demo_data(&db.pool).await.unwrap();
        seed_demo_data(&db.pool).await.unwrap();

        let owner = user::find_by_username(&db.pool, "owner1").await.unwrap().unwrap();
        assert_eq!(owner.role, UserRole::Owner);
        let products = product::find_all(&db.pool, None, None).await.unwrap();
        assert_eq!(products.len(), 2);
    }
}
