//! Order Model
//!
//! An order exclusively owns its items. Item prices are a snapshot of the
//! unit price at commit time, never a live reference to the product.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Customer, Product, UserPublic};

/// Default status for a committed order
pub const DEFAULT_ORDER_STATUS: &str = "PAID";

/// Payment method label (not a processed transaction)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum PaymentMethod {
    Cash,
    Card,
    Cod,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Card => "CARD",
            Self::Cod => "COD",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CASH" => Ok(Self::Cash),
            "CARD" => Ok(Self::Card),
            "COD" => Ok(Self::Cod),
            _ => Err(format!("unknown payment method: {s}")),
        }
    }
}

/// Where the sale happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum SaleType {
    Store,
    Takeaway,
    Delivery,
}

impl SaleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Store => "STORE",
            Self::Takeaway => "TAKEAWAY",
            Self::Delivery => "DELIVERY",
        }
    }
}

impl fmt::Display for SaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STORE" => Ok(Self::Store),
            "TAKEAWAY" => Ok(Self::Takeaway),
            "DELIVERY" => Ok(Self::Delivery),
            _ => Err(format!("unknown sale type: {s}")),
        }
    }
}

/// Order row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub staff_id: String,
    pub customer_id: String,
    pub payment_method: PaymentMethod,
    pub sale_type: SaleType,
    pub total_amount: f64,
    pub status: String,
    pub version: i64,
    pub idempotency_key: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order item row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Unit price at commit time
    pub price: f64,
}

/// Order item with its product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDetail {
    #[serde(flatten)]
    pub item: OrderItem,
    pub product: Option<Product>,
}

/// Order with resolved associations (API read model)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
    pub customer: Option<Customer>,
    pub staff: Option<UserPublic>,
}
