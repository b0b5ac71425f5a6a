use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    error::Result,
    handlers::{JsonBody, payload},
    middleware::auth::AuthenticatedUser,
    models::users::{PROFILE_FIELDS, UpdateProfile},
    services::users,
    state::AppState,
};

/// GET /api/v1/user
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<serde_json::Value>> {
    let mut conn = state.pool.acquire().await?;
    let profile = users::get_profile(&mut conn, user.id).await?;

    Ok(Json(serde_json::json!({ "user": profile })))
}

/// PATCH /api/v1/user
///
/// Updates name, email, timezone or password. A password change needs
/// `current_password` and a matching `password_confirmation`.
pub async fn update_current_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    body: JsonBody,
) -> Result<Json<serde_json::Value>> {
    let request = UpdateProfile::from_payload(&payload(body, PROFILE_FIELDS)?)?;

    let mut conn = state.pool.acquire().await?;
    let profile = users::update_profile(&mut conn, user.id, request).await?;

    Ok(Json(serde_json::json!({ "user": profile })))
}

/// DELETE /api/v1/user
///
/// Soft-deletes the account and signs it out everywhere.
pub async fn delete_current_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<StatusCode> {
    let mut conn = state.pool.acquire().await?;
    users::delete_account(&mut conn, user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
