use uuid::Uuid;

use crate::DbConn;
use crate::{
    error::{Error, Result},
    models::categories::{Category, CreateCategoryRequest, NewCategory, UpdateCategory, UpdateCategoryRequest},
    queries::categories,
    services::ownership::ensure_owner,
    validation::{validate_name, validate_optional_text},
};

const MAX_ICON_CHARS: usize = 50;

/// Resolves an active category and checks the caller owns it.
async fn find_owned(conn: &mut DbConn, user_id: Uuid, id: Uuid) -> Result<Category> {
    let category = categories::get_category_by_id(conn, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Category with ID {} not found", id)))?;
    ensure_owner(user_id, &category)?;
    Ok(category)
}

/// Same as `find_owned` but also resolves soft-deleted rows.
async fn find_owned_with_deleted(conn: &mut DbConn, user_id: Uuid, id: Uuid) -> Result<Category> {
    let category = categories::get_category_with_deleted(conn, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Category with ID {} not found", id)))?;
    ensure_owner(user_id, &category)?;
    Ok(category)
}

/// Checks that a category may be referenced by a new or re-pointed
/// transaction or budget: it exists, is active and belongs to `user_id`.
pub async fn ensure_assignable(conn: &mut DbConn, user_id: Uuid, category_id: Uuid) -> Result<()> {
    let assignable = categories::get_category_by_id(conn, category_id)
        .await?
        .is_some_and(|category| category.user_id == user_id);

    if !assignable {
        return Err(Error::validation("category_id", "The selected category is invalid"));
    }
    Ok(())
}

pub async fn list_categories(conn: &mut DbConn, user_id: Uuid) -> Result<Vec<Category>> {
    categories::list_categories(conn, user_id).await
}

pub async fn get_category(conn: &mut DbConn, user_id: Uuid, id: Uuid) -> Result<Category> {
    find_owned(conn, user_id, id).await
}

pub async fn create_category(conn: &mut DbConn, user_id: Uuid, request: CreateCategoryRequest) -> Result<Category> {
    let new_category = NewCategory {
        user_id,
        name: validate_name("name", &request.name)?,
        icon: validate_optional_text("icon", request.icon, MAX_ICON_CHARS)?,
    };

    categories::create_category(conn, new_category).await
}

pub async fn update_category(
    conn: &mut DbConn,
    user_id: Uuid,
    id: Uuid,
    request: UpdateCategoryRequest,
) -> Result<Category> {
    find_owned(conn, user_id, id).await?;

    let update = UpdateCategory {
        name: request.name.map(|name| validate_name("name", &name)).transpose()?,
        icon: request
            .icon
            .map(|icon| validate_optional_text("icon", icon, MAX_ICON_CHARS))
            .transpose()?,
    };

    categories::update_category(conn, id, update).await
}

/// Soft-deletes a category, or removes it outright when `force` is set.
///
/// A forced delete also accepts an already soft-deleted category.
pub async fn delete_category(conn: &mut DbConn, user_id: Uuid, id: Uuid, force: bool) -> Result<()> {
    if force {
        find_owned_with_deleted(conn, user_id, id).await?;
        categories::purge_category(conn, id).await?;
        tracing::info!(category_id = %id, user_id = %user_id, "category purged");
    } else {
        find_owned(conn, user_id, id).await?;
        categories::soft_delete_category(conn, id).await?;
    }
    Ok(())
}

pub async fn restore_category(conn: &mut DbConn, user_id: Uuid, id: Uuid) -> Result<Category> {
    let category = find_owned_with_deleted(conn, user_id, id).await?;
    if !category.is_deleted() {
        return Err(Error::Conflict("Category is not deleted".to_string()));
    }
    categories::restore_category(conn, id).await
}
