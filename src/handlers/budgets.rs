use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::{
    error::Result,
    handlers::{JsonBody, payload},
    middleware::auth::AuthenticatedUser,
    models::budgets::{
        CREATE_BUDGET_FIELDS, CreateBudgetRequest, UPDATE_BUDGET_FIELDS, UpdateBudgetRequest,
    },
    services::budgets::{self, BudgetViewer},
    state::AppState,
};

fn viewer(user: &AuthenticatedUser) -> BudgetViewer<'_> {
    BudgetViewer {
        user_id: user.id,
        timezone: user.timezone.as_deref(),
    }
}

/// GET /api/v1/budgets
///
/// Every budget carries its current `progress`.
pub async fn list_budgets(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    let budgets = budgets::list_budgets(&mut conn, viewer(&user)).await?;

    Ok(Json(serde_json::json!({ "budgets": budgets })))
}

/// POST /api/v1/budgets
///
/// # Request Body
/// - `category_id`: Optional; omitted or null makes an overall budget
/// - `limit`: Decimal string or number, zero or more
/// - `period`: `weekly`, `monthly` or `yearly`
/// - `start_date`: `YYYY-MM-DD`
/// - `end_date`: Optional; derived from the period when absent
pub async fn create_budget(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    body: JsonBody,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let request = CreateBudgetRequest::from_payload(&payload(body, CREATE_BUDGET_FIELDS)?)?;

    let mut conn = state.pool.acquire().await?;
    let budget = budgets::create_budget(&mut conn, viewer(&user), request).await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "budget": budget }))))
}

/// GET /api/v1/budgets/{id}
pub async fn get_budget(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    let budget = budgets::get_budget(&mut conn, viewer(&user), id).await?;

    Ok(Json(serde_json::json!({ "budget": budget })))
}

/// PATCH /api/v1/budgets/{id}
///
/// The category is fixed once created; sending `category_id` is rejected.
pub async fn update_budget(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    body: JsonBody,
) -> Result<Json<serde_json::Value>> {
    let request = UpdateBudgetRequest::from_payload(&payload(body, UPDATE_BUDGET_FIELDS)?)?;

    let mut conn = state.pool.acquire().await?;
    let budget = budgets::update_budget(&mut conn, viewer(&user), id, request).await?;

    Ok(Json(serde_json::json!({ "budget": budget })))
}

/// DELETE /api/v1/budgets/{id}
pub async fn delete_budget(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let mut conn = state.pool.acquire().await?;
    budgets::delete_budget(&mut conn, user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
