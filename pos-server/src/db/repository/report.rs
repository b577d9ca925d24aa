//! Report Repository
//!
//! Time ranges are half-open `[start, end)` Unix millis computed by the
//! API layer in the business timezone.

use super::RepoResult;
use shared::models::{PaymentMethod, ReportCustomer, ReportOrder, SaleType};
use sqlx::SqlitePool;

/// Sum of `total_amount` for orders created in `[start, end)`
pub async fn sum_between(pool: &SqlitePool, start: i64, end: i64) -> RepoResult<f64> {
    let total: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(total_amount), 0.0) FROM orders WHERE created_at >= ? AND created_at < ?",
    )
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;
    Ok(total)
}

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: String,
    created_at: i64,
    total_amount: f64,
    payment_method: PaymentMethod,
    sale_type: SaleType,
    customer_name: Option<String>,
    customer_phone: Option<String>,
}

/// Orders created in `[start, end)`, newest first, with customer contact
pub async fn orders_between(
    pool: &SqlitePool,
    start: i64,
    end: i64,
) -> RepoResult<Vec<ReportOrder>> {
    let rows = sqlx::query_as::<_, ReportRow>(
        "SELECT o.id, o.created_at, o.total_amount, o.payment_method, o.sale_type, \
                c.full_name AS customer_name, c.phone AS customer_phone \
         FROM orders o LEFT JOIN customers c ON c.id = o.customer_id \
         WHERE o.created_at >= ? AND o.created_at < ? \
         ORDER BY o.created_at DESC, o.rowid DESC",
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| ReportOrder {
            id: r.id,
            created_at: r.created_at,
            total_amount: r.total_amount,
            payment_method: r.payment_method,
            sale_type: r.sale_type,
            customer: match (r.customer_name, r.customer_phone) {
                (Some(full_name), Some(phone)) => Some(ReportCustomer { full_name, phone }),
                _ => None,
            },
        })
        .collect())
}
