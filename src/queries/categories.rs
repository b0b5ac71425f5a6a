use crate::{
    error::{Error, Result},
    models::categories::{Category, NewCategory, UpdateCategory},
};
use uuid::Uuid;

use crate::DbConn;

/// Lists a user's active categories, alphabetically.
pub async fn list_categories(conn: &mut DbConn, user_id: Uuid) -> Result<Vec<Category>> {
    let categories = sqlx::query_as!(
        Category,
        r#"
        SELECT id, user_id, name, icon, created_at, updated_at, deleted_at
        FROM categories
        WHERE user_id = $1 AND deleted_at IS NULL
        ORDER BY name ASC, id ASC
        "#,
        user_id,
    )
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(categories)
}

/// Gets an active category by ID, whoever owns it.
pub async fn get_category_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<Category>> {
    let category = sqlx::query_as!(
        Category,
        r#"
        SELECT id, user_id, name, icon, created_at, updated_at, deleted_at
        FROM categories
        WHERE id = $1 AND deleted_at IS NULL
        "#,
        id,
    )
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(category)
}

/// Gets a category by ID including soft-deleted rows.
pub async fn get_category_with_deleted(conn: &mut DbConn, id: Uuid) -> Result<Option<Category>> {
    let category = sqlx::query_as!(
        Category,
        r#"
        SELECT id, user_id, name, icon, created_at, updated_at, deleted_at
        FROM categories
        WHERE id = $1
        "#,
        id,
    )
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(category)
}

pub async fn create_category(conn: &mut DbConn, new_category: NewCategory) -> Result<Category> {
    let category = sqlx::query_as!(
        Category,
        r#"
        INSERT INTO categories (id, user_id, name, icon)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, name, icon, created_at, updated_at, deleted_at
        "#,
        Uuid::now_v7(),
        new_category.user_id,
        new_category.name,
        new_category.icon,
    )
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(category)
}

/// Applies a partial update to an active category.
pub async fn update_category(conn: &mut DbConn, id: Uuid, update: UpdateCategory) -> Result<Category> {
    let (set_icon, icon) = match update.icon {
        Some(value) => (true, value),
        None => (false, None),
    };

    let category = sqlx::query_as!(
        Category,
        r#"
        UPDATE categories
        SET name = COALESCE($2, name),
            icon = CASE WHEN $3::boolean THEN $4 ELSE icon END,
            updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING id, user_id, name, icon, created_at, updated_at, deleted_at
        "#,
        id,
        update.name,
        set_icon,
        icon,
    )
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    category.ok_or_else(|| Error::NotFound(format!("Category with ID {} not found", id)))
}

/// Soft-deletes a category. Returns the number of affected rows.
pub async fn soft_delete_category(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query!(
        r#"
        UPDATE categories
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

/// Clears `deleted_at` on a soft-deleted category.
pub async fn restore_category(conn: &mut DbConn, id: Uuid) -> Result<Category> {
    let category = sqlx::query_as!(
        Category,
        r#"
        UPDATE categories
        SET deleted_at = NULL, updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NOT NULL
        RETURNING id, user_id, name, icon, created_at, updated_at, deleted_at
        "#,
        id,
    )
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    category.ok_or_else(|| Error::NotFound(format!("Deleted category with ID {} not found", id)))
}

/// Removes the row. Budgets pointing at it fall back to overall budgets;
/// transactions keep the dangling reference.
pub async fn purge_category(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query!(
        r#"
        DELETE FROM categories
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
