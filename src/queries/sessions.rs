use crate::{
    error::{Error, Result},
    models::users::{NewUserSession, UserSession},
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::DbConn;

/// Hash a session token using SHA-256 for secure storage
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

/// Creates a new user session in the database.
pub async fn create_session(conn: &mut DbConn, new_session: NewUserSession) -> Result<UserSession> {
    let session = sqlx::query_as!(
        UserSession,
        r#"
        INSERT INTO user_sessions (id, user_id, token_hash, expires_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, token_hash, expires_at, created_at, updated_at
        "#,
        Uuid::now_v7(),
        new_session.user_id,
        new_session.token_hash,
        new_session.expires_at,
    )
    .fetch_one(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(session)
}

/// Gets a single session by its ID. The session may not exist.
pub async fn get_session_by_id(conn: &mut DbConn, id: Uuid) -> Result<Option<UserSession>> {
    let session = sqlx::query_as!(
        UserSession,
        r#"
        SELECT id, user_id, token_hash, expires_at, created_at, updated_at
        FROM user_sessions
        WHERE id = $1
        "#,
        id,
    )
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(session)
}

/// Gets a single session by its token hash. The session may not exist.
pub async fn get_session_by_token_hash(conn: &mut DbConn, token_hash: &str) -> Result<Option<UserSession>> {
    let session = sqlx::query_as!(
        UserSession,
        r#"
        SELECT id, user_id, token_hash, expires_at, created_at, updated_at
        FROM user_sessions
        WHERE token_hash = $1
        "#,
        token_hash,
    )
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(session)
}

/// Replaces a session's token hash, supporting refresh token rotation.
///
/// The match on the old hash makes rotation single-use: when two refreshes
/// race with the same token only one of them sees a row.
pub async fn rotate_session_token(
    conn: &mut DbConn,
    session_id: Uuid,
    old_token_hash: &str,
    new_token_hash: &str,
) -> Result<Option<UserSession>> {
    let session = sqlx::query_as!(
        UserSession,
        r#"
        UPDATE user_sessions
        SET token_hash = $3, updated_at = NOW()
        WHERE id = $1 AND token_hash = $2
        RETURNING id, user_id, token_hash, expires_at, created_at, updated_at
        "#,
        session_id,
        old_token_hash,
        new_token_hash,
    )
    .fetch_optional(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(session)
}

/// Deletes a session by its ID.
pub async fn delete_session(conn: &mut DbConn, session_id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query!(
        r#"
        DELETE FROM user_sessions
        WHERE id = $1
        "#,
        session_id,
    )
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}

/// Deletes all sessions for a specific user.
pub async fn delete_sessions_by_user(conn: &mut DbConn, user_id: Uuid) -> Result<u64> {
    let rows_affected = sqlx::query!(
        r#"
        DELETE FROM user_sessions
        WHERE user_id = $1
        "#,
        user_id,
    )
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}

/// Deletes all expired sessions.
pub async fn delete_expired_sessions(conn: &mut DbConn) -> Result<u64> {
    let rows_affected = sqlx::query!(
        r#"
        DELETE FROM user_sessions
        WHERE expires_at < NOW()
        "#,
    )
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}

/// Deletes sessions still held by soft-deleted users.
pub async fn delete_sessions_of_deleted_users(conn: &mut DbConn) -> Result<u64> {
    let rows_affected = sqlx::query!(
        r#"
        DELETE FROM user_sessions s
        USING users u
        WHERE s.user_id = u.id AND u.deleted_at IS NOT NULL
        "#,
    )
    .execute(conn)
    .await
    .map_err(Error::Sqlx)?
    .rows_affected();

    Ok(rows_affected)
}
