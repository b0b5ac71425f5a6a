use crate::{
    error::{Error, Result},
    models::users::{NewUser, UpdateUser, User},
};
use uuid::Uuid;

use crate::DbConn;

/// Maps a unique violation on the email column to a field error.
fn map_email_conflict(e: sqlx::Error) -> Error {
    let is_email_conflict = e
        .as_database_error()
        .and_then(|db| db.constraint())
        .is_some_and(|constraint| constraint == "users_email_key");

    if is_email_conflict {
        Error::validation("email", "The email has already been taken")
    } else {
        Error::Sqlx(e)
    }
}

/// Creates a new user in the database.
pub async fn create_user(conn: &mut DbConn, new_user: NewUser) -> Result<User> {
    let user = sqlx::query_as!(
        User,
        r#"
        INSERT INTO users (id, name, email, password_hash, timezone)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, email, password_hash, timezone, created_at, updated_at, deleted_at
        "#,
        Uuid::now_v7(),
        new_user.name,
        new_user.email,
        new_user.password_hash,
        new_user.timezone,
    )
    .fetch_one(conn)
    .await
    .map_err(map_email_conflict)?;

    Ok(user)
}

/// Gets a single user by their ID, soft-deleted or not. The user may not exist.
pub async fn get_user_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as!(
        User,
        r#"
        SELECT id, name, email, password_hash, timezone, created_at, updated_at, deleted_at
        FROM users
        WHERE id = $1
        "#,
        id,
    )
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(user)
}

/// Gets an active (not soft-deleted) user by email address.
pub async fn get_active_user_by_email(conn: &mut DbConn, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as!(
        User,
        r#"
        SELECT id, name, email, password_hash, timezone, created_at, updated_at, deleted_at
        FROM users
        WHERE email = $1 AND deleted_at IS NULL
        "#,
        email,
    )
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(user)
}

/// Applies a partial update. Absent fields keep their current value.
pub async fn update_user(conn: &mut DbConn, id: Uuid, update: UpdateUser) -> Result<User> {
    let (set_timezone, timezone) = match update.timezone {
        Some(value) => (true, value),
        None => (false, None),
    };

    let user = sqlx::query_as!(
        User,
        r#"
        UPDATE users
        SET name = COALESCE($2, name),
            email = COALESCE($3, email),
            password_hash = COALESCE($4, password_hash),
            timezone = CASE WHEN $5::boolean THEN $6 ELSE timezone END,
            updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING id, name, email, password_hash, timezone, created_at, updated_at, deleted_at
        "#,
        id,
        update.name,
        update.email,
        update.password_hash,
        set_timezone,
        timezone,
    )
    .fetch_optional(conn)
    .await
    .map_err(map_email_conflict)?;

    user.ok_or_else(|| Error::NotFound(format!("User with ID {} not found", id)))
}

/// Marks a user as deleted. Owned rows stay in place.
pub async fn soft_delete_user(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query!(
        r#"
        UPDATE users
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

/// Deletes a user and, through cascading keys, everything they own.
pub async fn delete_user(conn: &mut DbConn, id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query!(
        r#"
        DELETE FROM users
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
