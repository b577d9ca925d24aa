//! Order Repository
//!
//! Write helpers take an open transaction; the commit engine owns the
//! transaction boundary.

use super::RepoResult;
use shared::models::{Order, OrderItem, PaymentMethod, SaleType};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool, Transaction};

const COLUMNS: &str = "id, staff_id, customer_id, payment_method, sale_type, total_amount, \
                       status, version, idempotency_key, created_at, updated_at";

/// Scalar columns rewritten by an order update
#[derive(Debug, Clone)]
pub struct OrderScalars {
    pub customer_id: String,
    pub payment_method: PaymentMethod,
    pub sale_type: SaleType,
    pub status: String,
    pub total_amount: f64,
    pub updated_at: i64,
}

pub async fn find_by_id<'e, E>(exec: E, id: &str) -> RepoResult<Option<Order>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {COLUMNS} FROM orders WHERE id = ?");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(order)
}

pub async fn find_by_idempotency_key<'e, E>(exec: E, key: &str) -> RepoResult<Option<Order>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {COLUMNS} FROM orders WHERE idempotency_key = ? LIMIT 1");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(key)
        .fetch_optional(exec)
        .await?;
    Ok(order)
}

/// Newest first
pub async fn find_page(pool: &SqlitePool, limit: i64, offset: i64) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM orders ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?"
    );
    let orders = sqlx::query_as::<_, Order>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(orders)
}

/// Items of the given orders, in insertion order per order
pub async fn find_items_for_orders(
    pool: &SqlitePool,
    order_ids: &[String],
) -> RepoResult<Vec<OrderItem>> {
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, order_id, product_id, quantity, price FROM order_items WHERE order_id IN (",
    );
    let mut separated = qb.separated(", ");
    for id in order_ids {
        separated.push_bind(id.clone());
    }
    separated.push_unseparated(") ORDER BY order_id, position");
    let items = qb.build_query_as::<OrderItem>().fetch_all(pool).await?;
    Ok(items)
}

pub async fn insert_order(tx: &mut Transaction<'_, Sqlite>, order: &Order) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO orders (id, staff_id, customer_id, payment_method, sale_type, total_amount, \
         status, version, idempotency_key, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )
    .bind(&order.id)
    .bind(&order.staff_id)
    .bind(&order.customer_id)
    .bind(order.payment_method)
    .bind(order.sale_type)
    .bind(order.total_amount)
    .bind(&order.status)
    .bind(order.version)
    .bind(&order.idempotency_key)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn insert_items(tx: &mut Transaction<'_, Sqlite>, items: &[OrderItem]) -> RepoResult<()> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO order_items (id, order_id, product_id, quantity, price, position) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.price)
        .bind(position as i64)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn delete_items(tx: &mut Transaction<'_, Sqlite>, order_id: &str) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM order_items WHERE order_id = ?")
        .bind(order_id)
        .execute(&mut **tx)
        .await?;
    Ok(rows.rows_affected())
}

/// Rewrite the scalar columns and bump `version`. With `expected_version`
/// set, only a row still at that version is touched. Returns `false` when no
/// row matched.
pub async fn update_scalars(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
    expected_version: Option<i64>,
    data: &OrderScalars,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET customer_id = ?1, payment_method = ?2, sale_type = ?3, status = ?4, \
         total_amount = ?5, updated_at = ?6, version = version + 1 \
         WHERE id = ?7 AND (?8 IS NULL OR version = ?8)",
    )
    .bind(&data.customer_id)
    .bind(data.payment_method)
    .bind(data.sale_type)
    .bind(&data.status)
    .bind(data.total_amount)
    .bind(data.updated_at)
    .bind(id)
    .bind(expected_version)
    .execute(&mut **tx)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Returns whether a row was removed
pub async fn delete_order(tx: &mut Transaction<'_, Sqlite>, id: &str) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(rows.rows_affected() > 0)
}
