//! Customer Repository

use super::{RepoError, RepoResult, contains_pattern};
use shared::models::Customer;
use sqlx::SqlitePool;

/// Search results cap
pub const SEARCH_LIMIT: i64 = 50;

const COLUMNS: &str = "id, full_name, phone, email, created_at";

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Customer>> {
    let sql = format!("SELECT {COLUMNS} FROM customers WHERE id = ?");
    let customer = sqlx::query_as::<_, Customer>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(customer)
}

/// First customer with exactly this phone (oldest first; phone is not unique)
pub async fn find_first_by_phone(pool: &SqlitePool, phone: &str) -> RepoResult<Option<Customer>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM customers WHERE phone = ? ORDER BY created_at, rowid LIMIT 1"
    );
    let customer = sqlx::query_as::<_, Customer>(&sql)
        .bind(phone)
        .fetch_optional(pool)
        .await?;
    Ok(customer)
}

/// Name or phone contains `q` (case-insensitive), newest first
pub async fn search(pool: &SqlitePool, q: &str) -> RepoResult<Vec<Customer>> {
    let pattern = contains_pattern(q);
    let sql = format!(
        "SELECT {COLUMNS} FROM customers \
         WHERE lower(full_name) LIKE ?1 ESCAPE '\\' OR lower(phone) LIKE ?1 ESCAPE '\\' \
         ORDER BY created_at DESC, rowid DESC LIMIT ?2"
    );
    let customers = sqlx::query_as::<_, Customer>(&sql)
        .bind(pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(pool)
        .await?;
    Ok(customers)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Customer>> {
    let sql = format!("SELECT {COLUMNS} FROM customers ORDER BY created_at DESC, rowid DESC");
    let customers = sqlx::query_as::<_, Customer>(&sql).fetch_all(pool).await?;
    Ok(customers)
}

pub async fn create(
    pool: &SqlitePool,
    full_name: &str,
    phone: &str,
    email: Option<&str>,
) -> RepoResult<Customer> {
    let id = shared::util::new_id();
    let now = shared::util::now_millis();

    sqlx::query(
        "INSERT INTO customers (id, full_name, phone, email, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&id)
    .bind(full_name)
    .bind(phone)
    .bind(email)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, &id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create customer".into()))
}

/// Overwrite the name; overwrite the email only when one is supplied.
pub async fn update_contact(
    pool: &SqlitePool,
    id: &str,
    full_name: &str,
    email: Option<&str>,
) -> RepoResult<Customer> {
    let rows = sqlx::query(
        "UPDATE customers SET full_name = ?1, email = COALESCE(?2, email) WHERE id = ?3",
    )
    .bind(full_name)
    .bind(email)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Customer {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Customer {id} not found")))
}
