//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::models::{ProductCreate, ProductUpdate, ProductWithCategory};

use crate::api::json_body;
use crate::core::ServerState;
use crate::db::repository::product::{self, ProductFields};
use crate::db::repository::{RepoError, category};
use crate::orders::money::MAX_PRICE;
use crate::orders::payload::coerce_number;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, non_blank, normalize_image_url,
    validate_optional_text, validate_price, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

const INVALID_PAYLOAD: &str = "Invalid product payload";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub q: Option<String>,
    pub category_id: Option<String>,
    /// Exact barcode (scanner lookup)
    pub barcode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    ok: bool,
    product: ProductWithCategory,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    products: Vec<ProductWithCategory>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    ok: bool,
}

fn product_error(id: &str, err: RepoError) -> AppError {
    match err {
        RepoError::NotFound(_) => {
            AppError::new(ErrorCode::ProductNotFound).with_detail("productId", id)
        }
        RepoError::Conflict(msg) => {
            AppError::with_message(ErrorCode::ProductInUse, msg).with_detail("productId", id)
        }
        other => other.into(),
    }
}

fn parse_price(value: &Value) -> AppResult<f64> {
    let price = coerce_number(value)
        .ok_or_else(|| AppError::validation("Price must be a number").with_detail("field", "price"))?;
    validate_price(price, "price")?;
    if price > MAX_PRICE {
        return Err(AppError::validation(format!("price must not exceed {MAX_PRICE}"))
            .with_detail("field", "price"));
    }
    Ok(price)
}

/// Trim and length-check every field; blank optionals become `None`.
fn validate_fields(mut fields: ProductFields) -> AppResult<ProductFields> {
    fields.name = fields.name.trim().to_string();
    if fields.name.is_empty() {
        return Err(AppError::validation("Name is required").with_detail("field", "name"));
    }
    validate_required_text(&fields.name, "name", MAX_NAME_LEN)?;

    fields.barcode = non_blank(fields.barcode.as_deref());
    validate_optional_text(&fields.barcode, "barcode", MAX_SHORT_TEXT_LEN)?;
    fields.description = non_blank(fields.description.as_deref());
    validate_optional_text(&fields.description, "description", MAX_NOTE_LEN)?;
    fields.image_url = normalize_image_url(fields.image_url.as_deref())?;
    Ok(fields)
}

async fn ensure_category(state: &ServerState, category_id: &str) -> AppResult<()> {
    if category_id.trim().is_empty()
        || category::find_by_id(state.pool(), category_id).await?.is_none()
    {
        return Err(AppError::with_message(ErrorCode::InvalidCategory, "Invalid category")
            .with_detail("field", "categoryId"));
    }
    Ok(())
}

async fn load(state: &ServerState, id: &str) -> AppResult<ProductWithCategory> {
    product::find_with_category(state.pool(), id)
        .await?
        .ok_or_else(|| product_error(id, RepoError::NotFound(id.to_string())))
}

/// GET /api/products
///
/// `?q=` matches name, barcode or description; `?categoryId=` filters;
/// `?barcode=` is an exact lookup.
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ProductListResponse>> {
    if let Some(barcode) = non_blank(query.barcode.as_deref()) {
        let products = match product::find_by_barcode(state.pool(), &barcode).await? {
            Some(p) => vec![load(&state, &p.id).await?],
            None => Vec::new(),
        };
        return Ok(Json(ProductListResponse { products }));
    }

    let q = non_blank(query.q.as_deref());
    let category_id = non_blank(query.category_id.as_deref());
    let products = product::find_all(state.pool(), q.as_deref(), category_id.as_deref()).await?;
    Ok(Json(ProductListResponse { products }))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProductResponse>> {
    let product = load(&state, &id).await?;
    Ok(Json(ProductResponse { ok: true, product }))
}

/// POST /api/products
pub async fn create(
    State(state): State<ServerState>,
    body: Result<Json<ProductCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    let payload = json_body(body, INVALID_PAYLOAD)?;
    let price = match &payload.price {
        Some(v) => parse_price(v)?,
        None => {
            return Err(AppError::validation("Price is required").with_detail("field", "price"));
        }
    };
    let fields = validate_fields(ProductFields {
        name: payload.name,
        price,
        category_id: payload.category_id.trim().to_string(),
        barcode: payload.barcode,
        description: payload.description,
        image_url: payload.image_url,
    })?;
    ensure_category(&state, &fields.category_id).await?;

    let created = product::create(state.pool(), fields).await?;
    tracing::info!(product_id = %created.id, name = %created.name, "Product created");

    let product = load(&state, &created.id).await?;
    Ok((StatusCode::CREATED, Json(ProductResponse { ok: true, product })))
}

/// PUT /api/products/{id} - absent fields keep their value, blank optionals clear
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Result<Json<ProductUpdate>, JsonRejection>,
) -> AppResult<Json<ProductResponse>> {
    let payload = json_body(body, INVALID_PAYLOAD)?;
    let current = product::find_by_id(state.pool(), &id)
        .await?
        .ok_or_else(|| product_error(&id, RepoError::NotFound(id.clone())))?;

    let mut fields = ProductFields::from(current);
    if let Some(name) = payload.name {
        fields.name = name;
    }
    if let Some(price) = &payload.price {
        fields.price = parse_price(price)?;
    }
    if let Some(category_id) = payload.category_id {
        let category_id = category_id.trim().to_string();
        if category_id != fields.category_id {
            ensure_category(&state, &category_id).await?;
        }
        fields.category_id = category_id;
    }
    if payload.barcode.is_some() {
        fields.barcode = payload.barcode;
    }
    if payload.description.is_some() {
        fields.description = payload.description;
    }
    if payload.image_url.is_some() {
        fields.image_url = payload.image_url;
    }
    let fields = validate_fields(fields)?;

    product::update(state.pool(), &id, fields)
        .await
        .map_err(|e| product_error(&id, e))?;
    let product = load(&state, &id).await?;
    Ok(Json(ProductResponse { ok: true, product }))
}

/// DELETE /api/products/{id} - refused while order items reference it
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OkResponse>> {
    product::delete(state.pool(), &id)
        .await
        .map_err(|e| product_error(&id, e))?;
    tracing::info!(product_id = %id, "Product deleted");
    Ok(Json(OkResponse { ok: true }))
}
