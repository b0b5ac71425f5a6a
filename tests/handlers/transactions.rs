use reqwest::StatusCode;
use serde_json::json;

use crate::common::{
    TestApp, assert_field_error, auth_delete, auth_get, auth_patch, auth_post, create_category,
    create_transaction, register_user,
};

#[tokio::test]
async fn test_create_transaction_normalizes_amount() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;
    let category_id = create_category(&app, &user.access_token, "Coffee").await;

    let (status, body) = auth_post(
        &app,
        &user.access_token,
        "/api/v1/transactions",
        json!({
            "category_id": category_id,
            "amount": 4.5,
            "description": "  flat white  ",
            "transaction_date": "2025-06-03",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let transaction = &body["transaction"];
    assert_eq!(transaction["amount"], "4.50");
    assert_eq!(transaction["description"], "flat white");
    assert_eq!(transaction["transaction_date"], "2025-06-03");
    assert_eq!(transaction["user_id"], user.id.as_str());
    assert_eq!(transaction["category"]["name"], "Coffee");
    assert_eq!(transaction["category"]["is_deleted"], false);
}

#[tokio::test]
async fn test_create_uncategorized_transaction() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;

    let id = create_transaction(&app, &user.access_token, None, "10", "2025-06-03").await;

    let (status, body) = auth_get(&app, &user.access_token, &format!("/api/v1/transactions/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["transaction"]["category_id"].is_null());
    assert!(body["transaction"]["category"].is_null());
}

#[tokio::test]
async fn test_create_transaction_validation() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;

    let cases = [
        (json!({ "amount": "0", "transaction_date": "2025-06-01" }), "amount"),
        (json!({ "amount": "-5.00", "transaction_date": "2025-06-01" }), "amount"),
        (json!({ "amount": "1.005", "transaction_date": "2025-06-01" }), "amount"),
        (json!({ "amount": "10000000000.00", "transaction_date": "2025-06-01" }), "amount"),
        (json!({ "amount": "abc", "transaction_date": "2025-06-01" }), "amount"),
        (json!({ "transaction_date": "2025-06-01" }), "amount"),
        (json!({ "amount": "5.00", "transaction_date": "06/01/2025" }), "transaction_date"),
        (json!({ "amount": "5.00" }), "transaction_date"),
        (
            json!({ "amount": "5.00", "transaction_date": "2025-06-01", "user_id": user.id }),
            "user_id",
        ),
    ];

    for (body, field) in cases {
        let (status, response) = auth_post(&app, &user.access_token, "/api/v1/transactions", body).await;
        assert_field_error(status, &response, field);
    }
}

#[tokio::test]
async fn test_cannot_use_another_users_category() {
    let app = TestApp::new().await;
    let alice = register_user(&app).await;
    let bob = register_user(&app).await;
    let bobs_category = create_category(&app, &bob.access_token, "Bob's").await;

    let (status, body) = auth_post(
        &app,
        &alice.access_token,
        "/api/v1/transactions",
        json!({
            "category_id": bobs_category,
            "amount": "5.00",
            "transaction_date": "2025-06-01",
        }),
    )
    .await;

    assert_field_error(status, &body, "category_id");
    assert_eq!(body["fields"]["category_id"], "The selected category is invalid");
}

#[tokio::test]
async fn test_soft_deleted_category_still_resolves_on_transactions() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;
    let category_id = create_category(&app, &user.access_token, "Dining").await;
    let transaction_id = create_transaction(
        &app,
        &user.access_token,
        Some(&category_id),
        "42.00",
        "2025-06-05",
    )
    .await;

    let (status, _) = auth_delete(&app, &user.access_token, &format!("/api/v1/categories/{category_id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = auth_get(
        &app,
        &user.access_token,
        &format!("/api/v1/transactions/{transaction_id}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transaction"]["category"]["name"], "Dining");
    assert_eq!(body["transaction"]["category"]["is_deleted"], true);

    // New transactions cannot point at it
    let (status, body) = auth_post(
        &app,
        &user.access_token,
        "/api/v1/transactions",
        json!({
            "category_id": category_id,
            "amount": "5.00",
            "transaction_date": "2025-06-06",
        }),
    )
    .await;
    assert_field_error(status, &body, "category_id");

    // Editing other fields of the existing transaction is still fine
    let (status, body) = auth_patch(
        &app,
        &user.access_token,
        &format!("/api/v1/transactions/{transaction_id}"),
        json!({ "amount": "43.00" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transaction"]["amount"], "43.00");
    assert_eq!(body["transaction"]["category_id"], category_id.as_str());
}

#[tokio::test]
async fn test_list_transactions_filters() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;
    let other = register_user(&app).await;
    let food = create_category(&app, &user.access_token, "Food").await;

    create_transaction(&app, &user.access_token, Some(&food), "10.00", "2025-05-31").await;
    create_transaction(&app, &user.access_token, Some(&food), "20.00", "2025-06-15").await;
    create_transaction(&app, &user.access_token, None, "30.00", "2025-06-20").await;
    create_transaction(&app, &other.access_token, None, "99.00", "2025-06-20").await;

    let (status, body) = auth_get(&app, &user.access_token, "/api/v1/transactions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transactions"].as_array().unwrap().len(), 3);

    let (_, body) = auth_get(
        &app,
        &user.access_token,
        "/api/v1/transactions?from=2025-06-01&to=2025-06-30",
    )
    .await;
    let amounts: Vec<&str> = body["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["amount"].as_str().unwrap())
        .collect();
    assert_eq!(amounts.len(), 2);
    assert!(amounts.contains(&"20.00"));
    assert!(amounts.contains(&"30.00"));

    let (_, body) = auth_get(
        &app,
        &user.access_token,
        &format!("/api/v1/transactions?category_id={food}"),
    )
    .await;
    assert_eq!(body["transactions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_transactions_rejects_bad_filters() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;

    let (status, body) = auth_get(&app, &user.access_token, "/api/v1/transactions?from=June").await;
    assert_field_error(status, &body, "from");

    let (status, body) = auth_get(
        &app,
        &user.access_token,
        "/api/v1/transactions?from=2025-06-30&to=2025-06-01",
    )
    .await;
    assert_field_error(status, &body, "to");
}

#[tokio::test]
async fn test_other_users_transaction_is_forbidden() {
    let app = TestApp::new().await;
    let alice = register_user(&app).await;
    let bob = register_user(&app).await;
    let id = create_transaction(&app, &alice.access_token, None, "15.00", "2025-06-01").await;
    let path = format!("/api/v1/transactions/{id}");

    let (status, _) = auth_get(&app, &bob.access_token, &path).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = auth_patch(&app, &bob.access_token, &path, json!({ "amount": "1.00" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = auth_delete(&app, &bob.access_token, &path).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = auth_get(&app, &alice.access_token, &path).await;
    assert_eq!(body["transaction"]["amount"], "15.00");
}

#[tokio::test]
async fn test_update_transaction_fields() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;
    let category_id = create_category(&app, &user.access_token, "Misc").await;
    let id = create_transaction(&app, &user.access_token, Some(&category_id), "8.00", "2025-06-01").await;
    let path = format!("/api/v1/transactions/{id}");

    let (status, body) = auth_patch(
        &app,
        &user.access_token,
        &path,
        json!({ "category_id": null, "description": "lunch", "transaction_date": "2025-06-02" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["transaction"]["category_id"].is_null());
    assert_eq!(body["transaction"]["description"], "lunch");
    assert_eq!(body["transaction"]["transaction_date"], "2025-06-02");
    assert_eq!(body["transaction"]["amount"], "8.00");

    let (status, body) = auth_patch(&app, &user.access_token, &path, json!({})).await;
    assert_field_error(status, &body, "body");

    let (status, body) = auth_patch(&app, &user.access_token, &path, json!({ "amount": "0.00" })).await;
    assert_field_error(status, &body, "amount");
}

#[tokio::test]
async fn test_delete_and_restore_transaction() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;
    let id = create_transaction(&app, &user.access_token, None, "12.00", "2025-06-01").await;
    let path = format!("/api/v1/transactions/{id}");

    let (status, _) = auth_delete(&app, &user.access_token, &path).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = auth_get(&app, &user.access_token, &path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = auth_get(&app, &user.access_token, "/api/v1/transactions").await;
    assert!(body["transactions"].as_array().unwrap().is_empty());

    let (status, body) = auth_post(&app, &user.access_token, &format!("{path}/restore"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transaction"]["id"], id.as_str());

    let (status, _) = auth_post(&app, &user.access_token, &format!("{path}/restore"), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}
