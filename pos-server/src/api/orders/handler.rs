//! Order API Handlers
//!
//! Thin adapters over [`OrderCommitEngine`](crate::orders::OrderCommitEngine):
//! body normalization, inline customer resolution and status codes.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use shared::models::OrderDetail;

use crate::api::json_body;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::payload::normalize;
use crate::orders::{CreateOutcome, OrderDraft, OrderError, OrderPayload};
use crate::receipt;
use crate::utils::{AppError, AppResult, ErrorCode};

const INVALID_PAYLOAD: &str = "Invalid order payload";

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    order: OrderDetail,
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    orders: Vec<OrderDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Fill `customer_id` from inline customer details when it is absent.
async fn resolve_customer(
    state: &ServerState,
    payload: &OrderPayload,
    draft: &mut OrderDraft,
) -> AppResult<()> {
    if draft.customer_id.is_none()
        && let Some(details) = &payload.customer
    {
        draft.customer_id = Some(state.customers.resolve_id(details).await?);
    }
    Ok(())
}

/// GET /api/orders - newest first
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<OrderListResponse>> {
    let orders = state.orders.list(query.limit, query.offset).await?;
    Ok(Json(OrderListResponse { orders }))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderResponse>> {
    let order = state
        .orders
        .get(&id)
        .await?
        .ok_or_else(|| OrderError::NotFound(id.clone()))?;
    Ok(Json(OrderResponse { order }))
}

/// POST /api/orders
///
/// 201 for a new order, 200 when an idempotency key replays an earlier one.
pub async fn create(
    State(state): State<ServerState>,
    staff: Option<CurrentUser>,
    body: Result<Json<OrderPayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<OrderResponse>)> {
    let staff = staff.ok_or_else(|| {
        AppError::with_message(ErrorCode::NotAuthenticated, "Missing staff session")
    })?;
    let payload = json_body(body, INVALID_PAYLOAD)?;
    let mut draft = normalize(&payload)?;
    if draft.lines.is_empty() {
        return Err(OrderError::Empty.into());
    }
    resolve_customer(&state, &payload, &mut draft).await?;

    let (status, order) = match state.orders.create(&staff, draft).await? {
        CreateOutcome::Created(d) => (StatusCode::CREATED, d),
        CreateOutcome::Replayed(d) => (StatusCode::OK, d),
    };
    Ok((status, Json(OrderResponse { order })))
}

/// PUT /api/orders/{id} - replace items and scalars
pub async fn update(
    State(state): State<ServerState>,
    _staff: CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<OrderPayload>, JsonRejection>,
) -> AppResult<Json<OrderResponse>> {
    let payload = json_body(body, INVALID_PAYLOAD)?;
    let mut draft = normalize(&payload)?;
    if draft.lines.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::OrderEmpty,
            "Invalid order payload: items must not be empty",
        ));
    }
    resolve_customer(&state, &payload, &mut draft).await?;

    let order = state.orders.update(&id, draft).await?;
    Ok(Json(OrderResponse { order }))
}

/// DELETE /api/orders/{id} - 204 whether or not the order existed
pub async fn delete(
    State(state): State<ServerState>,
    _staff: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.orders.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/orders/{id}/receipt - plain text, 48 columns
pub async fn receipt(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let order = state
        .orders
        .get(&id)
        .await?
        .ok_or_else(|| OrderError::NotFound(id.clone()))?;
    let text = receipt::render(&order, state.config.business_timezone);
    Ok(([(CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response())
}
