use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    error::Result,
    handlers::{JsonBody, payload},
    middleware::auth::AuthenticatedUser,
    models::users::{
        LOGIN_FIELDS, LoginResult, LoginUser, REFRESH_FIELDS, REGISTER_FIELDS, RefreshTokenResult,
        RegisterUser,
    },
    services::{sessions, users},
    state::AppState,
};

/// POST /api/v1/auth/register
///
/// Registers a new user and logs them in.
///
/// # Request Body
/// - `name`: Display name
/// - `email`: Email address (must be unique)
/// - `password`: 8-128 characters, no spaces
/// - `password_confirmation`: Must match password
/// - `timezone`: Optional IANA timezone name
///
/// # HTTP Status Codes
/// - `201 CREATED`: User registered, tokens issued
/// - `400 BAD_REQUEST`: Validation error (including an email already taken)
pub async fn register(
    State(state): State<AppState>,
    body: JsonBody,
) -> Result<(StatusCode, Json<LoginResult>)> {
    let request = RegisterUser::from_payload(&payload(body, REGISTER_FIELDS)?)?;

    let mut conn = state.pool.acquire().await?;
    let result = users::register_user(&mut conn, request, &state.config.jwt).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

/// POST /api/v1/auth/login
///
/// Authenticates a user with email and password.
///
/// # Returns
/// - `user`: User object
/// - `access_token`: JWT access token
/// - `refresh_token`: Refresh token, rotated on every refresh
/// - `access_token_expires_at`, `refresh_token_expires_at`: ISO 8601 timestamps
///
/// # HTTP Status Codes
/// - `200 OK`: Authentication successful
/// - `400 BAD_REQUEST`: Validation error (missing email/password)
/// - `401 UNAUTHORIZED`: Invalid email or password
pub async fn login(State(state): State<AppState>, body: JsonBody) -> Result<Json<LoginResult>> {
    let request = LoginUser::from_payload(&payload(body, LOGIN_FIELDS)?)?;

    let mut conn = state.pool.acquire().await?;
    let result = users::login_user(&mut conn, request, &state.config.jwt).await?;

    Ok(Json(result))
}

/// POST /api/v1/auth/refresh
///
/// Exchanges a refresh token for a new access token and a rotated refresh
/// token. The old refresh token stops working.
pub async fn refresh(State(state): State<AppState>, body: JsonBody) -> Result<Json<RefreshTokenResult>> {
    let refresh_token: String = payload(body, REFRESH_FIELDS)?.required("refresh_token")?;

    let mut conn = state.pool.acquire().await?;
    let result = sessions::refresh_session(&mut conn, &refresh_token, &state.config.jwt).await?;

    Ok(Json(result))
}

/// POST /api/v1/auth/logout
///
/// Revokes the session behind the presented access token.
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<StatusCode> {
    let mut conn = state.pool.acquire().await?;
    sessions::revoke_session(&mut conn, user.session_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
