use chrono::{Duration, Utc};
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::DbConn;
use crate::{
    config::JwtConfig,
    error::{Error, Result},
    models::users::{NewUserSession, RefreshTokenResult},
    queries::{sessions, users},
    services::{jwt, refresh_tokens},
};

/// Opens a new session for `user_id` and mints its first token pair.
pub async fn issue_session(conn: &mut DbConn, user_id: Uuid, config: &JwtConfig) -> Result<RefreshTokenResult> {
    let refresh_token = refresh_tokens::generate_refresh_token(config)?;
    let refresh_token_expires_at = Utc::now() + Duration::days(config.refresh_token_expiration_days);

    let session = sessions::create_session(
        conn,
        NewUserSession {
            user_id,
            token_hash: sessions::hash_session_token(&refresh_token),
            expires_at: refresh_token_expires_at,
        },
    )
    .await?;

    let (access_token, access_token_expires_at) = jwt::generate_jwt(
        user_id,
        session.id,
        config.secret.expose_secret(),
        config.access_token_expiration_minutes,
    )?;

    Ok(RefreshTokenResult {
        access_token,
        refresh_token,
        access_token_expires_at,
        refresh_token_expires_at: session.expires_at,
    })
}

/// Exchanges a refresh token for a new token pair, rotating the refresh token.
///
/// The presented token is single-use; replaying it after a successful refresh
/// fails with `InvalidToken`.
pub async fn refresh_session(conn: &mut DbConn, refresh_token: &str, config: &JwtConfig) -> Result<RefreshTokenResult> {
    let refresh_token = refresh_token.trim();
    refresh_tokens::verify_refresh_token(refresh_token, config)?;

    let token_hash = sessions::hash_session_token(refresh_token);
    let session = sessions::get_session_by_token_hash(conn, &token_hash)
        .await?
        .ok_or_else(|| Error::InvalidToken("Refresh token not recognized".to_string()))?;

    if session.is_expired() {
        sessions::delete_session(conn, session.id).await?;
        return Err(Error::SessionExpired("Session has expired".to_string()));
    }

    let user_active = users::get_user_by_id(conn, session.user_id)
        .await?
        .is_some_and(|user| !user.is_deleted());
    if !user_active {
        sessions::delete_session(conn, session.id).await?;
        return Err(Error::InvalidToken("Refresh token not recognized".to_string()));
    }

    let new_refresh_token = refresh_tokens::generate_refresh_token(config)?;
    let new_hash = sessions::hash_session_token(&new_refresh_token);
    let session = sessions::rotate_session_token(conn, session.id, &token_hash, &new_hash)
        .await?
        .ok_or_else(|| Error::InvalidToken("Refresh token already used".to_string()))?;

    let (access_token, access_token_expires_at) = jwt::generate_jwt(
        session.user_id,
        session.id,
        config.secret.expose_secret(),
        config.access_token_expiration_minutes,
    )?;

    Ok(RefreshTokenResult {
        access_token,
        refresh_token: new_refresh_token,
        access_token_expires_at,
        refresh_token_expires_at: session.expires_at,
    })
}

/// Ends one session. Access tokens minted from it stop working immediately.
pub async fn revoke_session(conn: &mut DbConn, session_id: Uuid) -> Result<()> {
    let rows_affected = sessions::delete_session(conn, session_id).await?;
    if rows_affected == 0 {
        return Err(Error::InvalidToken("Session not found".to_string()));
    }
    Ok(())
}

/// Revokes all sessions for a specific user
pub async fn revoke_all_user_sessions(conn: &mut DbConn, user_id: Uuid) -> Result<u64> {
    sessions::delete_sessions_by_user(conn, user_id).await
}

/// Purges expired sessions and sessions still held by deleted accounts.
pub async fn cleanup_sessions(conn: &mut DbConn) -> Result<u64> {
    let expired = sessions::delete_expired_sessions(conn).await?;
    let orphaned = sessions::delete_sessions_of_deleted_users(conn).await?;
    Ok(expired + orphaned)
}
