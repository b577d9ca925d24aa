//! Product Model

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Category;

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub category_id: String,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: i64,
}

/// Product with its category (list / detail responses)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithCategory {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    #[serde(default)]
    pub name: String,
    /// Number or numeric string
    pub price: Option<Value>,
    #[serde(default)]
    pub category_id: String,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Update product payload (absent fields keep their value)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    /// Number or numeric string
    pub price: Option<Value>,
    pub category_id: Option<String>,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}
