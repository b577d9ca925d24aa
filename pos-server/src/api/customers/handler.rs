//! Customer API Handlers

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use shared::models::{Customer, CustomerInput};

use crate::api::json_body;
use crate::core::ServerState;
use crate::customers::Resolution;
use crate::db::repository::customer;
use crate::utils::validation::non_blank;
use crate::utils::{AppError, AppResult, ErrorCode};

#[derive(Debug, Deserialize)]
pub struct CustomerQuery {
    pub phone: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    customer: Option<Customer>,
}

#[derive(Debug, Serialize)]
pub struct CustomerListResponse {
    customers: Vec<Customer>,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    customer: Customer,
    /// walk-in | updated | created
    resolution: &'static str,
}

fn resolution_label(r: Resolution) -> &'static str {
    match r {
        Resolution::WalkIn => "walk-in",
        Resolution::Updated => "updated",
        Resolution::Created => "created",
    }
}

/// GET /api/customers
///
/// - `?phone=` exact match, `{customer}` (null when absent)
/// - `?q=` name or phone contains, `{customers}` (max 50)
/// - neither: all customers, newest first
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<CustomerQuery>,
) -> AppResult<Response> {
    if let Some(phone) = non_blank(query.phone.as_deref()) {
        let customer = customer::find_first_by_phone(state.pool(), &phone).await?;
        return Ok(Json(CustomerResponse { customer }).into_response());
    }

    let customers = match non_blank(query.q.as_deref()) {
        Some(q) => customer::search(state.pool(), &q).await?,
        None => customer::find_all(state.pool()).await?,
    };
    Ok(Json(CustomerListResponse { customers }).into_response())
}

/// POST /api/customers - find by phone, refresh contact, or create
pub async fn find_or_create(
    State(state): State<ServerState>,
    body: Result<Json<CustomerInput>, JsonRejection>,
) -> AppResult<Json<CustomerResponse>> {
    let input = json_body(body, "fullName and phone required")?;
    if non_blank(input.full_name.as_deref()).is_none() || non_blank(input.phone.as_deref()).is_none() {
        return Err(AppError::with_message(
            ErrorCode::CustomerIncomplete,
            "fullName and phone required",
        ));
    }

    let (customer, _) = state.customers.resolve(&input).await?;
    Ok(Json(CustomerResponse {
        customer: Some(customer),
    }))
}

/// POST /api/customers/resolve - blank details resolve to the walk-in customer
pub async fn resolve(
    State(state): State<ServerState>,
    body: Result<Json<CustomerInput>, JsonRejection>,
) -> AppResult<Json<ResolveResponse>> {
    let input = json_body(body, "Invalid customer payload")?;
    let (customer, how) = state.customers.resolve(&input).await?;
    Ok(Json(ResolveResponse {
        customer,
        resolution: resolution_label(how),
    }))
}
