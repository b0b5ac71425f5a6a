use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::transactions::{
        NewTransaction, Transaction, TransactionFilter, TransactionWithCategory, UpdateTransaction,
    },
};

use crate::DbConn;

/// Transaction columns joined with the category, looked up through soft deletes.
const JOINED_SELECT: &str = r#"
    SELECT t.id, t.user_id, t.category_id, t.amount, t.description, t.transaction_date,
           t.created_at, t.updated_at, t.deleted_at,
           (c.id IS NOT NULL) AS category_found,
           c.name AS category_name,
           c.icon AS category_icon,
           c.deleted_at AS category_deleted_at
    FROM transactions t
    LEFT JOIN categories c ON c.id = t.category_id
"#;

/// Lists a user's active transactions, newest first.
pub async fn list_transactions(
    conn: &mut DbConn,
    user_id: Uuid,
    filter: &TransactionFilter,
) -> Result<Vec<TransactionWithCategory>> {
    let rows = sqlx::query_as::<_, TransactionWithCategory>(&format!(
        r#"
        {JOINED_SELECT}
        WHERE t.user_id = $1
          AND t.deleted_at IS NULL
          AND ($2::date IS NULL OR t.transaction_date >= $2)
          AND ($3::date IS NULL OR t.transaction_date <= $3)
          AND ($4::uuid IS NULL OR t.category_id = $4)
        ORDER BY t.transaction_date DESC, t.id DESC
        "#
    ))
    .bind(user_id)
    .bind(filter.from)
    .bind(filter.to)
    .bind(filter.category_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(rows)
}

/// Gets an active transaction by ID with its category, whoever owns it.
pub async fn get_transaction_by_id(
    conn: &mut DbConn,
    id: Uuid,
) -> Result<Option<TransactionWithCategory>> {
    let row = sqlx::query_as::<_, TransactionWithCategory>(&format!(
        "{JOINED_SELECT} WHERE t.id = $1 AND t.deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(row)
}

/// Gets a transaction by ID including soft-deleted rows.
pub async fn get_transaction_with_deleted(conn: &mut DbConn, id: Uuid) -> Result<Option<Transaction>> {
    let row = sqlx::query_as!(
        Transaction,
        r#"
        SELECT id, user_id, category_id, amount, description, transaction_date,
               created_at, updated_at, deleted_at
        FROM transactions
        WHERE id = $1
        "#,
        id,
    )
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(row)
}

pub async fn create_transaction(conn: &mut DbConn, new_transaction: NewTransaction) -> Result<Uuid> {
    let id = sqlx::query_scalar!(
        r#"
        INSERT INTO transactions (id, user_id, category_id, amount, description, transaction_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
        Uuid::now_v7(),
        new_transaction.user_id,
        new_transaction.category_id,
        new_transaction.amount,
        new_transaction.description,
        new_transaction.transaction_date,
    )
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(id)
}

/// Applies a partial update to an active transaction.
pub async fn update_transaction(conn: &mut DbConn, id: Uuid, update: UpdateTransaction) -> Result<()> {
    let (set_category, category_id) = match update.category_id {
        Some(value) => (true, value),
        None => (false, None),
    };
    let (set_description, description) = match update.description {
        Some(value) => (true, value),
        None => (false, None),
    };

    let rows_affected = sqlx::query!(
        r#"
        UPDATE transactions
        SET category_id = CASE WHEN $2::boolean THEN $3 ELSE category_id END,
            amount = COALESCE($4, amount),
            description = CASE WHEN $5::boolean THEN $6 ELSE description END,
            transaction_date = COALESCE($7, transaction_date),
            updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        "#,
        id,
        set_category,
        category_id,
        update.amount,
        set_description,
        description,
        update.transaction_date,
    )
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    if rows_affected == 0 {
        return Err(Error::NotFound(format!("Transaction with ID {} not found", id)));
    }

    Ok(())
}

pub async fn soft_delete_transaction(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query!(
        r#"
        UPDATE transactions
        SET deleted_at = NOW(), updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        "#,
        id,
    )
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}

pub async fn restore_transaction(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query!(
        r#"
        UPDATE transactions
        SET deleted_at = NULL, updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NOT NULL
        "#,
        id,
    )
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}

/// Sum of a user's active transactions dated within `[start, end]`,
/// optionally restricted to one category.
///
/// Returns `None` when the user row does not exist, so callers can tell an
/// unresolvable owner apart from a user with no spending.
pub async fn sum_spent(
    conn: &mut DbConn,
    user_id: Uuid,
    category_id: Option<Uuid>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Option<Decimal>> {
    let spent = sqlx::query_scalar!(
        r#"
        SELECT COALESCE(SUM(t.amount), 0) AS "spent!"
        FROM users u
        LEFT JOIN transactions t
            ON t.user_id = u.id
           AND t.deleted_at IS NULL
           AND t.transaction_date BETWEEN $2 AND $3
           AND ($4::uuid IS NULL OR t.category_id = $4)
        WHERE u.id = $1
        GROUP BY u.id
        "#,
        user_id,
        start,
        end,
        category_id,
    )
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(spent)
}
