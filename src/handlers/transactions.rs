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
    models::transactions::{
        CreateTransactionRequest, TRANSACTION_FIELDS, TransactionFilter, UpdateTransactionRequest,
    },
    services::transactions,
    state::AppState,
    validation::parse_date,
};

/// Raw query string for listing. Dates are parsed by hand so a malformed
/// value is reported against its own field.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub category_id: Option<Uuid>,
}

impl TransactionQuery {
    fn into_filter(self) -> Result<TransactionFilter> {
        Ok(TransactionFilter {
            from: self.from.as_deref().map(|d| parse_date("from", d)).transpose()?,
            to: self.to.as_deref().map(|d| parse_date("to", d)).transpose()?,
            category_id: self.category_id,
        })
    }
}

/// GET /api/v1/transactions
///
/// # Query Parameters
/// - `from`, `to`: Inclusive `YYYY-MM-DD` bounds on `transaction_date`
/// - `category_id`: Only transactions in this category
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<serde_json::Value>> {
    let filter = query.into_filter()?;

    let mut conn = state.pool.acquire().await?;
    let transactions = transactions::list_transactions(&mut conn, user.id, filter).await?;

    Ok(Json(serde_json::json!({ "transactions": transactions })))
}

/// POST /api/v1/transactions
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    body: JsonBody,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let request = CreateTransactionRequest::from_payload(&payload(body, TRANSACTION_FIELDS)?)?;

    let mut conn = state.pool.acquire().await?;
    let transaction = transactions::create_transaction(&mut conn, user.id, request).await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "transaction": transaction }))))
}

/// GET /api/v1/transactions/{id}
pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    let transaction = transactions::get_transaction(&mut conn, user.id, id).await?;

    Ok(Json(serde_json::json!({ "transaction": transaction })))
}

/// PATCH /api/v1/transactions/{id}
pub async fn update_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    body: JsonBody,
) -> Result<Json<serde_json::Value>> {
    let request = UpdateTransactionRequest::from_payload(&payload(body, TRANSACTION_FIELDS)?)?;

    let mut conn = state.pool.acquire().await?;
    let transaction = transactions::update_transaction(&mut conn, user.id, id, request).await?;

    Ok(Json(serde_json::json!({ "transaction": transaction })))
}

/// DELETE /api/v1/transactions/{id}
pub async fn delete_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let mut conn = state.pool.acquire().await?;
    transactions::delete_transaction(&mut conn, user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/transactions/{id}/restore
pub async fn restore_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    let transaction = transactions::restore_transaction(&mut conn, user.id, id).await?;

    Ok(Json(serde_json::json!({ "transaction": transaction })))
}
