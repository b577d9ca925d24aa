//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{User, UserCreate, UserPublic};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, username, password_hash, role, email, full_name, nic, mobile_number, \
                       reset_token_hash, reset_token_expires, created_at";

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<User>> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE id = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Exact match on the stored (lowercased) username
pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<User>> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE username = ? LIMIT 1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Case-insensitive match on email or username
pub async fn find_by_identifier(pool: &SqlitePool, identifier: &str) -> RepoResult<Option<User>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM users WHERE lower(email) = lower(?1) OR lower(username) = lower(?1) \
         ORDER BY created_at LIMIT 1"
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(identifier)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_public(pool: &SqlitePool, id: &str) -> RepoResult<Option<UserPublic>> {
    let user = sqlx::query_as::<_, UserPublic>(
        "SELECT id, username, full_name, role FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Insert a user. UNIQUE violations surface as [`RepoError::Duplicate`]
/// naming `username` or `email`.
pub async fn create(pool: &SqlitePool, data: UserCreate) -> RepoResult<User> {
    let id = shared::util::new_id();
    let now = shared::util::now_millis();

    sqlx::query(
        "INSERT INTO users (id, username, password_hash, role, email, full_name, nic, mobile_number, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(&id)
    .bind(&data.username)
    .bind(&data.password_hash)
    .bind(data.role)
    .bind(&data.email)
    .bind(&data.full_name)
    .bind(&data.nic)
    .bind(&data.mobile_number)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, &id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// Store the digest of a fresh reset token, replacing any previous one.
pub async fn set_reset_token(
    pool: &SqlitePool,
    user_id: &str,
    token_hash: &str,
    expires_at: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE users SET reset_token_hash = ?1, reset_token_expires = ?2 WHERE id = ?3")
        .bind(token_hash)
        .bind(expires_at)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Replace the password of the user holding an unexpired `token_hash` and
/// clear the token in the same statement. Returns `false` when no such user.
pub async fn consume_reset_token(
    pool: &SqlitePool,
    token_hash: &str,
    now: i64,
    password_hash: &str,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE users SET password_hash = ?1, reset_token_hash = NULL, reset_token_expires = NULL \
         WHERE reset_token_hash = ?2 AND reset_token_expires > ?3",
    )
    .bind(password_hash)
    .bind(token_hash)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}
