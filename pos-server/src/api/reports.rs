//! Sales reports (owner only)
//!
//! | Query | Response |
//! |-------|----------|
//! | `?from=YYYY-MM-DD&to=YYYY-MM-DD` | [`RangeReport`] |
//! | none | [`SalesSummary`] (today, this week from Sunday, this month) |
//!
//! Day boundaries are local to the configured business timezone.

use axum::{
    Json, Router,
    extract::{Query, State},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use shared::models::{RangeReport, SalesSummary};

use crate::auth::require_owner;
use crate::core::ServerState;
use crate::db::repository::report;
use crate::orders::money::{order_total, to_decimal, to_f64};
use crate::utils::time::{date_range_millis, parse_date, sales_windows};
use crate::utils::validation::non_blank;
use crate::utils::{AppError, AppResult};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/reports", get(get_report))
        .route_layer(middleware::from_fn(require_owner))
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Round a summed REAL column to cents
fn cents(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// GET /api/reports
pub async fn get_report(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let tz = state.config.business_timezone;

    match (non_blank(query.from.as_deref()), non_blank(query.to.as_deref())) {
        (Some(from), Some(to)) => {
            let (start, end) = date_range_millis(parse_date(&from)?, parse_date(&to)?, tz)?;
            let orders = report::orders_between(state.pool(), start, end).await?;
            let total_sales = order_total(orders.iter().map(|o| (o.total_amount, 1)));
            Ok(Json(RangeReport {
                total_sales,
                order_count: orders.len() as i64,
                orders,
            })
            .into_response())
        }
        (None, None) => {
            let now = chrono::Utc::now();
            let windows = sales_windows(now, tz);
            let end = now.timestamp_millis() + 1;
            let pool = state.pool();
            let summary = SalesSummary {
                daily_sales: cents(report::sum_between(pool, windows.day_start, end).await?),
                weekly_sales: cents(report::sum_between(pool, windows.week_start, end).await?),
                monthly_sales: cents(report::sum_between(pool, windows.month_start, end).await?),
            };
            Ok(Json(summary).into_response())
        }
        _ => Err(AppError::validation("Both from and to are required for a range report")),
    }
}
