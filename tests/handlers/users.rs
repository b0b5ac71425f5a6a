use reqwest::{Method, StatusCode};
use serde_json::json;

use crate::common::{
    TEST_PASSWORD, TestApp, assert_field_error, auth_delete, auth_get, auth_patch,
    register_user, register_user_with, send,
};

#[tokio::test]
async fn test_get_current_user() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;

    let (status, body) = auth_get(&app, &user.access_token, "/api/v1/user").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user.id.as_str());
    assert_eq!(body["user"]["email"], user.email.as_str());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_update_profile_fields() {
    let app = TestApp::new().await;
    let user = register_user_with(&app, json!({ "timezone": "Asia/Tokyo" })).await;

    let (status, body) = auth_patch(
        &app,
        &user.access_token,
        "/api/v1/user",
        json!({ "name": "Renamed" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Renamed");
    assert_eq!(body["user"]["timezone"], "Asia/Tokyo");

    // Explicit null clears the timezone
    let (status, body) = auth_patch(
        &app,
        &user.access_token,
        "/api/v1/user",
        json!({ "timezone": null }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["user"]["timezone"].is_null());
    assert_eq!(body["user"]["name"], "Renamed");
}

#[tokio::test]
async fn test_update_profile_rejects_empty_and_prohibited_bodies() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;

    let (status, body) = auth_patch(&app, &user.access_token, "/api/v1/user", json!({})).await;
    assert_field_error(status, &body, "body");

    let (status, body) = auth_patch(
        &app,
        &user.access_token,
        "/api/v1/user",
        json!({ "id": "00000000-0000-0000-0000-000000000000" }),
    )
    .await;
    assert_field_error(status, &body, "id");
}

#[tokio::test]
async fn test_change_password_requires_current_password() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;
    let new_password = "BrandNewPass456!";

    let (status, body) = auth_patch(
        &app,
        &user.access_token,
        "/api/v1/user",
        json!({
            "password": new_password,
            "password_confirmation": new_password,
        }),
    )
    .await;
    assert_field_error(status, &body, "current_password");

    let (status, _) = auth_patch(
        &app,
        &user.access_token,
        "/api/v1/user",
        json!({
            "current_password": TEST_PASSWORD,
            "password": new_password,
            "password_confirmation": new_password,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": user.email, "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": user.email, "password": new_password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_email_to_taken_address() {
    let app = TestApp::new().await;
    let first = register_user(&app).await;
    let second = register_user(&app).await;

    let (status, body) = auth_patch(
        &app,
        &second.access_token,
        "/api/v1/user",
        json!({ "email": first.email }),
    )
    .await;

    assert_field_error(status, &body, "email");
}

#[tokio::test]
async fn test_delete_account_blocks_further_access() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;

    let (status, _) = auth_delete(&app, &user.access_token, "/api/v1/user").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = auth_get(&app, &user.access_token, "/api/v1/user").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": user.email, "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(json!({ "refresh_token": user.refresh_token })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
