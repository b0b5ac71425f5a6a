use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::Result,
    handlers::{JsonBody, payload},
    middleware::auth::AuthenticatedUser,
    models::categories::{CATEGORY_FIELDS, CreateCategoryRequest, UpdateCategoryRequest},
    services::categories,
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct DeleteCategoryParams {
    #[serde(default)]
    pub force: bool,
}

/// GET /api/v1/categories
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    let categories = categories::list_categories(&mut conn, user.id).await?;

    Ok(Json(serde_json::json!({ "categories": categories })))
}

/// POST /api/v1/categories
pub async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    body: JsonBody,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let request = CreateCategoryRequest::from_payload(&payload(body, CATEGORY_FIELDS)?)?;

    let mut conn = state.pool.acquire().await?;
    let category = categories::create_category(&mut conn, user.id, request).await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "category": category }))))
}

/// GET /api/v1/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    let category = categories::get_category(&mut conn, user.id, id).await?;

    Ok(Json(serde_json::json!({ "category": category })))
}

/// PATCH /api/v1/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    body: JsonBody,
) -> Result<Json<serde_json::Value>> {
    let request = UpdateCategoryRequest::from_payload(&payload(body, CATEGORY_FIELDS)?)?;

    let mut conn = state.pool.acquire().await?;
    let category = categories::update_category(&mut conn, user.id, id, request).await?;

    Ok(Json(serde_json::json!({ "category": category })))
}

/// DELETE /api/v1/categories/{id}
///
/// Soft delete by default. `?force=true` removes the row: budgets on it
/// become overall budgets and transactions keep a dangling reference.
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteCategoryParams>,
) -> Result<StatusCode> {
    let mut conn = state.pool.acquire().await?;
    categories::delete_category(&mut conn, user.id, id, params.force).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/categories/{id}/restore
pub async fn restore_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    let category = categories::restore_category(&mut conn, user.id, id).await?;

    Ok(Json(serde_json::json!({ "category": category })))
}
