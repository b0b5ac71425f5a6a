//! JWT authentication middleware
//!
//! Access tokens are bound to a session row, so logging out or deleting the
//! account revokes them before they expire.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    models::users::User,
    queries,
    services::jwt::{extract_token_from_header, verify_jwt},
    state::AppState,
};

/// Authenticated user extracted from JWT token
///
/// Added to request extensions by [`jwt_auth_middleware`].
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    /// User's unique identifier
    pub id: Uuid,
    pub email: String,
    pub name: String,
    /// IANA timezone used for "today" in budget progress
    pub timezone: Option<String>,
    /// Session backing the presented access token
    #[serde(skip)]
    pub session_id: Uuid,
}

impl AuthenticatedUser {
    fn new(user: User, session_id: Uuid) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            timezone: user.timezone,
            session_id,
        }
    }
}

/// JWT authentication middleware
///
/// # Behavior
/// 1. Extracts the bearer token from the Authorization header
/// 2. Validates JWT signature and expiration
/// 3. Checks the session named by the token still exists and is unexpired
/// 4. Loads the user, rejecting soft-deleted accounts
/// 5. Adds `AuthenticatedUser` to request extensions
///
/// # Usage
/// ```ignore
/// Router::new()
///     .route("/protected", get(protected_handler))
///     .route_layer(middleware::from_fn_with_state(
///         state.clone(),
///         jwt_auth_middleware,
///     ))
/// ```
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let auth_header = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());
    let token = extract_token_from_header(auth_header)?;
    let claims = verify_jwt(token, state.config.jwt.secret.expose_secret())?;
    let user_id = claims.user_id()?;
    let session_id = claims.session_id()?;

    let mut conn = state.pool.acquire().await?;

    let session = queries::sessions::get_session_by_id(&mut conn, session_id)
        .await?
        .filter(|session| session.user_id == user_id)
        .ok_or_else(|| Error::InvalidToken("Session has been revoked".to_string()))?;
    if session.is_expired() {
        return Err(Error::SessionExpired("Session has expired".to_string()));
    }

    let user = queries::users::get_user_by_id(&mut conn, user_id)
        .await?
        .filter(|user| !user.is_deleted())
        .ok_or_else(|| Error::Authentication("User not found".to_string()))?;
    drop(conn);

    request
        .extensions_mut()
        .insert(AuthenticatedUser::new(user, session_id));
    Ok(next.run(request).await)
}
