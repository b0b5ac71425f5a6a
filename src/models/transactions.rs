use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::models::categories::CategorySummary;
use crate::validation::Payload;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub amount: Decimal,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Transaction row joined with its category, looked up through soft deletes.
///
/// `category_found` is false when the category row has been purged (or the
/// transaction is uncategorized).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransactionWithCategory {
    #[sqlx(flatten)]
    pub transaction: Transaction,
    pub category_found: bool,
    pub category_name: Option<String>,
    pub category_icon: Option<String>,
    pub category_deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub amount: Decimal,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTransaction {
    pub category_id: Option<Option<Uuid>>,
    pub amount: Option<Decimal>,
    pub description: Option<Option<String>>,
    pub transaction_date: Option<NaiveDate>,
}

pub const TRANSACTION_FIELDS: &[&str] = &["category_id", "amount", "description", "transaction_date"];

/// HTTP payload for creating a transaction
#[derive(Debug, Clone)]
pub struct CreateTransactionRequest {
    pub category_id: Option<Uuid>,
    pub amount: Decimal,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
}

impl CreateTransactionRequest {
    pub fn from_payload(payload: &Payload) -> Result<Self> {
        Ok(Self {
            category_id: payload.optional("category_id")?,
            amount: payload.required("amount")?,
            description: payload.optional("description")?,
            transaction_date: payload.required("transaction_date")?,
        })
    }
}

/// HTTP payload for a partial transaction update
#[derive(Debug, Clone, Default)]
pub struct UpdateTransactionRequest {
    pub category_id: Option<Option<Uuid>>,
    pub amount: Option<Decimal>,
    pub description: Option<Option<String>>,
    pub transaction_date: Option<NaiveDate>,
}

impl UpdateTransactionRequest {
    pub fn from_payload(payload: &Payload) -> Result<Self> {
        payload.require_any()?;
        Ok(Self {
            category_id: payload.nullable("category_id")?,
            amount: payload.optional("amount")?,
            description: payload.nullable("description")?,
            transaction_date: payload.optional("transaction_date")?,
        })
    }
}

/// Query-string filters for listing transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionResponse {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category: Option<CategorySummary>,
}

impl From<TransactionWithCategory> for TransactionResponse {
    fn from(row: TransactionWithCategory) -> Self {
        let category = match (row.transaction.category_id, row.category_found) {
            (Some(id), true) => Some(CategorySummary {
                id: Some(id),
                name: row.category_name.unwrap_or_default(),
                icon: row.category_icon,
                is_deleted: row.category_deleted_at.is_some(),
            }),
            _ => None,
        };

        Self {
            transaction: row.transaction,
            category,
        }
    }
}
