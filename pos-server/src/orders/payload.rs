//! Cart payload normalization
//!
//! Clients send loosely typed carts (numbers as strings, `unitPrice`
//! instead of `price`). Everything is normalized here, before the commit
//! engine sees it.

use serde::Deserialize;
use serde_json::Value;
use shared::models::{CustomerInput, DEFAULT_ORDER_STATUS, PaymentMethod, SaleType};

use super::money::{MAX_PRICE, MAX_QUANTITY};
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, non_blank};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Raw order body (`POST /api/orders`, `PUT /api/orders/{id}`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub customer_id: Option<String>,
    /// Inline customer details, resolved when `customerId` is absent
    pub customer: Option<CustomerInput>,
    pub items: Option<Vec<ItemPayload>>,
    pub payment_method: Option<String>,
    pub sale_type: Option<String>,
    pub total_amount: Option<Value>,
    pub status: Option<String>,
    pub idempotency_key: Option<String>,
    /// Optimistic concurrency precondition (update only)
    pub version: Option<i64>,
}

/// Raw cart line
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    pub product_id: Option<String>,
    pub quantity: Option<Value>,
    pub price: Option<Value>,
    pub unit_price: Option<Value>,
}

/// Normalized cart line
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
    /// Unit price snapshot
    pub price: f64,
}

/// Normalized order input
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub customer_id: Option<String>,
    pub lines: Vec<CartLine>,
    pub payment_method: Option<PaymentMethod>,
    pub sale_type: Option<SaleType>,
    /// Client-declared total, checked against the computed one
    pub declared_total: Option<f64>,
    pub status: Option<String>,
    pub idempotency_key: Option<String>,
    pub expected_version: Option<i64>,
}

impl OrderDraft {
    pub fn status_or_default(&self) -> String {
        self.status
            .clone()
            .unwrap_or_else(|| DEFAULT_ORDER_STATUS.to_string())
    }
}

/// JSON number or numeric string → f64
pub(crate) fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn invalid_item(index: usize, msg: impl std::fmt::Display) -> AppError {
    AppError::with_message(ErrorCode::InvalidOrderItem, format!("items[{index}]: {msg}"))
        .with_detail("index", index)
}

/// Normalize one line. `Ok(None)` means the line is dropped (quantity
/// missing, unparseable or ≤ 0).
fn normalize_line(index: usize, item: &ItemPayload) -> AppResult<Option<CartLine>> {
    // fractional quantities truncate toward zero
    let quantity = match item.quantity.as_ref().and_then(coerce_number) {
        Some(q) => q.trunc() as i64,
        None => return Ok(None),
    };
    if quantity <= 0 {
        return Ok(None);
    }
    if quantity > MAX_QUANTITY {
        return Err(invalid_item(
            index,
            format!("quantity exceeds maximum allowed ({MAX_QUANTITY})"),
        ));
    }

    let Some(product_id) = non_blank(item.product_id.as_deref()) else {
        return Err(invalid_item(index, "productId is required"));
    };

    let raw_price = item.price.as_ref().or(item.unit_price.as_ref());
    let price = match raw_price {
        None | Some(Value::Null) => 0.0,
        Some(v) => coerce_number(v).ok_or_else(|| invalid_item(index, "price must be a number"))?,
    };
    if price < 0.0 {
        return Err(invalid_item(index, "price must be non-negative"));
    }
    if price > MAX_PRICE {
        return Err(invalid_item(
            index,
            format!("price exceeds maximum allowed ({MAX_PRICE})"),
        ));
    }

    Ok(Some(CartLine {
        product_id,
        quantity,
        price,
    }))
}

fn parse_enum<T: std::str::FromStr<Err = String>>(
    value: Option<&str>,
    code: ErrorCode,
) -> AppResult<Option<T>> {
    match non_blank(value) {
        None => Ok(None),
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::with_message(code, e)),
    }
}

/// Normalize a raw payload. Lines that do not survive normalization are
/// dropped; an empty result is the caller's decision.
pub fn normalize(payload: &OrderPayload) -> AppResult<OrderDraft> {
    let mut lines = Vec::new();
    for (index, item) in payload.items.iter().flatten().enumerate() {
        if let Some(line) = normalize_line(index, item)? {
            lines.push(line);
        }
    }

    let status = non_blank(payload.status.as_deref());
    if let Some(s) = &status
        && s.len() > MAX_SHORT_TEXT_LEN
    {
        return Err(AppError::validation("status is too long").with_detail("field", "status"));
    }

    let idempotency_key = non_blank(payload.idempotency_key.as_deref());
    if let Some(k) = &idempotency_key
        && k.len() > MAX_SHORT_TEXT_LEN
    {
        return Err(AppError::validation("idempotencyKey is too long")
            .with_detail("field", "idempotencyKey"));
    }

    Ok(OrderDraft {
        customer_id: non_blank(payload.customer_id.as_deref()),
        lines,
        payment_method: parse_enum(payload.payment_method.as_deref(), ErrorCode::InvalidPaymentMethod)?,
        sale_type: parse_enum(payload.sale_type.as_deref(), ErrorCode::InvalidSaleType)?,
        declared_total: payload.total_amount.as_ref().and_then(coerce_number),
        status,
        idempotency_key,
        expected_version: payload.version,
    })
}
