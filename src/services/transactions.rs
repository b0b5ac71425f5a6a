use uuid::Uuid;

use crate::DbConn;
use crate::{
    error::{Error, Result},
    models::transactions::{
        CreateTransactionRequest, NewTransaction, TransactionFilter, TransactionResponse,
        UpdateTransaction, UpdateTransactionRequest,
    },
    queries::transactions,
    services::{categories, ownership::ensure_owner},
    validation::{validate_amount, validate_optional_text},
};

const MAX_DESCRIPTION_CHARS: usize = 255;

async fn load(conn: &mut DbConn, user_id: Uuid, id: Uuid) -> Result<TransactionResponse> {
    let row = transactions::get_transaction_by_id(conn, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Transaction with ID {} not found", id)))?;
    ensure_owner(user_id, &row)?;
    Ok(row.into())
}

pub async fn list_transactions(
    conn: &mut DbConn,
    user_id: Uuid,
    filter: TransactionFilter,
) -> Result<Vec<TransactionResponse>> {
    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if to < from {
            return Err(Error::validation("to", "The to date must be on or after the from date"));
        }
    }

    let rows = transactions::list_transactions(conn, user_id, &filter).await?;
    Ok(rows.into_iter().map(TransactionResponse::from).collect())
}

pub async fn get_transaction(conn: &mut DbConn, user_id: Uuid, id: Uuid) -> Result<TransactionResponse> {
    load(conn, user_id, id).await
}

pub async fn create_transaction(
    conn: &mut DbConn,
    user_id: Uuid,
    request: CreateTransactionRequest,
) -> Result<TransactionResponse> {
    let amount = validate_amount("amount", request.amount)?;
    let description = validate_optional_text("description", request.description, MAX_DESCRIPTION_CHARS)?;

    if let Some(category_id) = request.category_id {
        categories::ensure_assignable(conn, user_id, category_id).await?;
    }

    let id = transactions::create_transaction(
        conn,
        NewTransaction {
            user_id,
            category_id: request.category_id,
            amount,
            description,
            transaction_date: request.transaction_date,
        },
    )
    .await?;

    load(conn, user_id, id).await
}

pub async fn update_transaction(
    conn: &mut DbConn,
    user_id: Uuid,
    id: Uuid,
    request: UpdateTransactionRequest,
) -> Result<TransactionResponse> {
    let current = load(conn, user_id, id).await?;

    let amount = request
        .amount
        .map(|amount| validate_amount("amount", amount))
        .transpose()?;
    let description = request
        .description
        .map(|text| validate_optional_text("description", text, MAX_DESCRIPTION_CHARS))
        .transpose()?;

    // Keeping the current reference is allowed even if that category has
    // since been soft-deleted; only a change of category is checked.
    if let Some(Some(category_id)) = request.category_id {
        if current.transaction.category_id != Some(category_id) {
            categories::ensure_assignable(conn, user_id, category_id).await?;
        }
    }

    transactions::update_transaction(
        conn,
        id,
        UpdateTransaction {
            category_id: request.category_id,
            amount,
            description,
            transaction_date: request.transaction_date,
        },
    )
    .await?;

    load(conn, user_id, id).await
}

pub async fn delete_transaction(conn: &mut DbConn, user_id: Uuid, id: Uuid) -> Result<()> {
    load(conn, user_id, id).await?;
    transactions::soft_delete_transaction(conn, id).await?;
    Ok(())
}

pub async fn restore_transaction(conn: &mut DbConn, user_id: Uuid, id: Uuid) -> Result<TransactionResponse> {
    let transaction = transactions::get_transaction_with_deleted(conn, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Transaction with ID {} not found", id)))?;
    ensure_owner(user_id, &transaction)?;

    if transaction.deleted_at.is_none() {
        return Err(Error::Conflict("Transaction is not deleted".to_string()));
    }

    transactions::restore_transaction(conn, id).await?;
    load(conn, user_id, id).await
}
