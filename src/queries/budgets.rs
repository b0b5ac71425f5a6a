use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::budgets::{BudgetPeriod, BudgetWithCategory, NewBudget, UpdateBudget},
};

use crate::DbConn;

const JOINED_SELECT: &str = r#"
    SELECT b.id, b.user_id, b.category_id, b.amount_limit, b.period, b.start_date, b.end_date,
           b.created_at, b.updated_at,
           c.name AS category_name,
           c.icon AS category_icon,
           c.deleted_at AS category_deleted_at
    FROM budgets b
    LEFT JOIN categories c ON c.id = b.category_id
"#;

/// Lists a user's budgets, most recent period first.
pub async fn list_budgets(conn: &mut DbConn, user_id: Uuid) -> Result<Vec<BudgetWithCategory>> {
    let budgets = sqlx::query_as::<_, BudgetWithCategory>(&format!(
        "{JOINED_SELECT} WHERE b.user_id = $1 ORDER BY b.start_date DESC, b.id DESC"
    ))
    .bind(user_id)
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(budgets)
}

/// Gets a budget by ID with its category, whoever owns it.
pub async fn get_budget_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<BudgetWithCategory>> {
    let budget = sqlx::query_as::<_, BudgetWithCategory>(&format!("{JOINED_SELECT} WHERE b.id = $1"))
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(budget)
}

pub async fn create_budget(conn: &mut DbConn, new_budget: NewBudget) -> Result<Uuid> {
    let id = sqlx::query_scalar!(
        r#"
        INSERT INTO budgets (id, user_id, category_id, amount_limit, period, start_date, end_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
        Uuid::now_v7(),
        new_budget.user_id,
        new_budget.category_id,
        new_budget.limit,
        new_budget.period as BudgetPeriod,
        new_budget.start_date,
        new_budget.end_date,
    )
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(id)
}

/// Applies a partial update. The category column is never touched.
pub async fn update_budget(conn: &mut DbConn, id: Uuid, update: UpdateBudget) -> Result<()> {
    let rows_affected = sqlx::query!(
        r#"
        UPDATE budgets
        SET amount_limit = COALESCE($2, amount_limit),
            period = COALESCE($3, period),
            start_date = COALESCE($4, start_date),
            end_date = COALESCE($5, end_date),
            updated_at = NOW()
        WHERE id = $1
        "#,
        id,
        update.limit,
        update.period as Option<BudgetPeriod>,
        update.start_date,
        update.end_date,
    )
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    if rows_affected == 0 {
        return Err(Error::NotFound(format!("Budget with ID {} not found", id)));
    }

    Ok(())
}

pub async fn delete_budget(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query!(
        r#"
        DELETE FROM budgets
        WHERE id = $1
        "#,
        id,
    )
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}
