//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;
use shared::models::{Category, CategoryCreate, CategoryUpdate};

use crate::api::json_body;
use crate::core::ServerState;
use crate::db::repository::{RepoError, category};
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    ok: bool,
    category: Category,
}

#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    ok: bool,
    categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    ok: bool,
}

fn category_error(id: &str, err: RepoError) -> AppError {
    match err {
        RepoError::NotFound(_) => {
            AppError::new(ErrorCode::CategoryNotFound).with_detail("categoryId", id)
        }
        RepoError::Duplicate(_) => {
            AppError::new(ErrorCode::CategoryNameExists).with_detail("field", "name")
        }
        RepoError::Conflict(msg) => {
            AppError::with_message(ErrorCode::CategoryHasProducts, msg).with_detail("categoryId", id)
        }
        other => other.into(),
    }
}

fn valid_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Name required").with_detail("field", "name"));
    }
    validate_required_text(name, "name", MAX_NAME_LEN)?;
    Ok(name.to_string())
}

/// GET /api/categories - newest first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<CategoryListResponse>> {
    let categories = category::find_all(state.pool()).await?;
    Ok(Json(CategoryListResponse {
        ok: true,
        categories,
    }))
}

/// GET /api/categories/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<CategoryResponse>> {
    let category = category::find_by_id(state.pool(), &id)
        .await?
        .ok_or_else(|| category_error(&id, RepoError::NotFound(id.clone())))?;
    Ok(Json(CategoryResponse { ok: true, category }))
}

/// POST /api/categories
pub async fn create(
    State(state): State<ServerState>,
    body: Result<Json<CategoryCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CategoryResponse>)> {
    let payload = json_body(body, "Name required")?;
    let name = valid_name(&payload.name)?;
    let category = category::create(state.pool(), &name)
        .await
        .map_err(|e| category_error("", e))?;
    tracing::info!(category_id = %category.id, name = %category.name, "Category created");
    Ok((StatusCode::CREATED, Json(CategoryResponse { ok: true, category })))
}

/// PUT /api/categories/{id} - rename
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Result<Json<CategoryUpdate>, JsonRejection>,
) -> AppResult<Json<CategoryResponse>> {
    let payload = json_body(body, "Name required")?;
    let name = valid_name(&payload.name)?;
    let category = category::rename(state.pool(), &id, &name)
        .await
        .map_err(|e| category_error(&id, e))?;
    Ok(Json(CategoryResponse { ok: true, category }))
}

/// DELETE /api/categories/{id} - refused while products reference it
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OkResponse>> {
    category::delete(state.pool(), &id)
        .await
        .map_err(|e| category_error(&id, e))?;
    tracing::info!(category_id = %id, "Category deleted");
    Ok(Json(OkResponse { ok: true }))
}
