//! Sales report models

use serde::{Deserialize, Serialize};

use super::{PaymentMethod, SaleType};

/// Rolling totals for the current day, week (Sunday start) and month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub daily_sales: f64,
    pub weekly_sales: f64,
    pub monthly_sales: f64,
}

/// Customer contact as shown in a report row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCustomer {
    pub full_name: String,
    pub phone: String,
}

/// One order in a date-range report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOrder {
    pub id: String,
    pub created_at: i64,
    pub total_amount: f64,
    pub payment_method: PaymentMethod,
    pub sale_type: SaleType,
    pub customer: Option<ReportCustomer>,
}

/// Date-range report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeReport {
    pub total_sales: f64,
    pub order_count: i64,
    pub orders: Vec<ReportOrder>,
}
