//! Customer Model

use serde::{Deserialize, Serialize};

/// Customer entity. `phone` is the lookup key but not unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub created_at: i64,
}

/// Find-or-create payload (`POST /api/customers`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
