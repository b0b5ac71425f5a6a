use reqwest::StatusCode;
use serde_json::json;

use crate::common::{
    TestApp, assert_field_error, auth_delete, auth_get, auth_patch, auth_post, create_budget,
    create_category, create_transaction, register_user,
};

fn june_budget(limit: &str) -> serde_json::Value {
    json!({
        "limit": limit,
        "period": "monthly",
        "start_date": "2025-06-01",
        "end_date": "2025-06-30",
    })
}

#[tokio::test]
async fn test_overall_budget_under_limit() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;
    let food = create_category(&app, &user.access_token, "Food").await;

    create_transaction(&app, &user.access_token, Some(&food), "200.00", "2025-06-02").await;
    create_transaction(&app, &user.access_token, None, "250.00", "2025-06-30").await;
    // Outside the window
    create_transaction(&app, &user.access_token, None, "999.00", "2025-07-01").await;

    let budget = create_budget(&app, &user.access_token, june_budget("1000")).await;

    assert_eq!(budget["limit"], "1000.00");
    assert!(budget["category_id"].is_null());
    assert_eq!(budget["category"]["name"], "Overall Budget");
    assert_eq!(budget["progress"]["spent"], "450.00");
    assert_eq!(budget["progress"]["remaining"], "550.00");
    assert_eq!(budget["progress"]["progress_percent"], "45.00");
    assert_eq!(budget["progress"]["is_over_budget"], false);
}

#[tokio::test]
async fn test_overall_budget_over_limit() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;

    create_transaction(&app, &user.access_token, None, "700.00", "2025-06-10").await;
    create_transaction(&app, &user.access_token, None, "500.00", "2025-06-11").await;

    let budget = create_budget(&app, &user.access_token, june_budget("1000.00")).await;

    assert_eq!(budget["progress"]["spent"], "1200.00");
    assert_eq!(budget["progress"]["remaining"], "0.00");
    assert_eq!(budget["progress"]["progress_percent"], "120.00");
    assert_eq!(budget["progress"]["is_over_budget"], true);
}

#[tokio::test]
async fn test_zero_limit_budget() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;

    create_transaction(&app, &user.access_token, None, "10.00", "2025-06-10").await;

    let budget = create_budget(&app, &user.access_token, june_budget("0")).await;

    assert_eq!(budget["progress"]["limit"], "0.00");
    assert_eq!(budget["progress"]["progress_percent"], "0.00");
    assert_eq!(budget["progress"]["is_over_budget"], true);
}

#[tokio::test]
async fn test_category_budget_counts_only_its_category() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;
    let other = register_user(&app).await;
    let food = create_category(&app, &user.access_token, "Food").await;
    let rent = create_category(&app, &user.access_token, "Rent").await;

    create_transaction(&app, &user.access_token, Some(&food), "60.00", "2025-06-03").await;
    create_transaction(&app, &user.access_token, Some(&rent), "900.00", "2025-06-01").await;
    create_transaction(&app, &user.access_token, None, "5.00", "2025-06-03").await;
    create_transaction(&app, &other.access_token, None, "75.00", "2025-06-03").await;

    let mut body = june_budget("300");
    body["category_id"] = json!(food);
    let budget = create_budget(&app, &user.access_token, body).await;

    assert_eq!(budget["category"]["name"], "Food");
    assert_eq!(budget["progress"]["spent"], "60.00");
    assert_eq!(budget["progress"]["progress_percent"], "20.00");
}

#[tokio::test]
async fn test_deleted_transactions_do_not_count() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;

    let id = create_transaction(&app, &user.access_token, None, "100.00", "2025-06-10").await;
    create_transaction(&app, &user.access_token, None, "40.00", "2025-06-12").await;
    auth_delete(&app, &user.access_token, &format!("/api/v1/transactions/{id}")).await;

    let budget = create_budget(&app, &user.access_token, june_budget("100")).await;

    assert_eq!(budget["progress"]["spent"], "40.00");
}

#[tokio::test]
async fn test_end_date_defaults_from_period() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;

    let cases = [
        ("weekly", "2025-06-02", "2025-06-08"),
        ("monthly", "2025-01-15", "2025-02-14"),
        ("yearly", "2025-01-01", "2025-12-31"),
    ];

    for (period, start, expected_end) in cases {
        let budget = create_budget(
            &app,
            &user.access_token,
            json!({ "limit": "100", "period": period, "start_date": start }),
        )
        .await;
        assert_eq!(budget["period"], period);
        assert_eq!(budget["end_date"], expected_end);
    }
}

#[tokio::test]
async fn test_create_budget_validation() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;
    let other = register_user(&app).await;
    let foreign_category = create_category(&app, &other.access_token, "Not yours").await;

    let cases = [
        (json!({ "limit": "-1", "period": "monthly", "start_date": "2025-06-01" }), "limit"),
        (json!({ "limit": "1.234", "period": "monthly", "start_date": "2025-06-01" }), "limit"),
        (json!({ "period": "monthly", "start_date": "2025-06-01" }), "limit"),
        (json!({ "limit": "100", "period": "daily", "start_date": "2025-06-01" }), "period"),
        (json!({ "limit": "100", "period": "monthly" }), "start_date"),
        (
            json!({ "limit": "100", "period": "monthly", "start_date": "2025-06-10", "end_date": "2025-06-01" }),
            "end_date",
        ),
        (
            json!({ "limit": "100", "period": "monthly", "start_date": "2025-06-01", "category_id": foreign_category }),
            "category_id",
        ),
        (
            json!({ "limit": "100", "period": "monthly", "start_date": "2025-06-01", "user_id": other.id }),
            "user_id",
        ),
    ];

    for (body, field) in cases {
        let (status, response) = auth_post(&app, &user.access_token, "/api/v1/budgets", body).await;
        assert_field_error(status, &response, field);
    }
}

#[tokio::test]
async fn test_update_budget() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;
    let budget = create_budget(&app, &user.access_token, june_budget("500")).await;
    let path = format!("/api/v1/budgets/{}", budget["id"].as_str().unwrap());

    let (status, body) = auth_patch(&app, &user.access_token, &path, json!({ "limit": "750.5" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["budget"]["limit"], "750.50");
    assert_eq!(body["budget"]["end_date"], "2025-06-30");

    // Switching the period recomputes the end date
    let (status, body) = auth_patch(&app, &user.access_token, &path, json!({ "period": "weekly" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["budget"]["period"], "weekly");
    assert_eq!(body["budget"]["end_date"], "2025-06-07");

    let (status, body) = auth_patch(&app, &user.access_token, &path, json!({ "end_date": "2025-05-01" })).await;
    assert_field_error(status, &body, "end_date");

    let (status, body) = auth_patch(&app, &user.access_token, &path, json!({})).await;
    assert_field_error(status, &body, "body");
}

#[tokio::test]
async fn test_budget_category_is_immutable() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;
    let food = create_category(&app, &user.access_token, "Food").await;
    let budget = create_budget(&app, &user.access_token, june_budget("500")).await;
    let path = format!("/api/v1/budgets/{}", budget["id"].as_str().unwrap());

    let (status, body) = auth_patch(&app, &user.access_token, &path, json!({ "category_id": food })).await;

    assert_field_error(status, &body, "category_id");
    assert_eq!(body["fields"]["category_id"], "This field is prohibited");
}

#[tokio::test]
async fn test_purged_category_demotes_budget_to_overall() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;
    let food = create_category(&app, &user.access_token, "Food").await;

    let mut body = june_budget("500");
    body["category_id"] = json!(food);
    let budget = create_budget(&app, &user.access_token, body).await;
    let path = format!("/api/v1/budgets/{}", budget["id"].as_str().unwrap());

    let (status, _) = auth_delete(
        &app,
        &user.access_token,
        &format!("/api/v1/categories/{food}?force=true"),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = auth_get(&app, &user.access_token, &path).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["budget"]["category_id"].is_null());
    assert_eq!(body["budget"]["category"]["name"], "Overall Budget");
}

#[tokio::test]
async fn test_soft_deleted_category_budget_keeps_its_category() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;
    let food = create_category(&app, &user.access_token, "Food").await;
    create_transaction(&app, &user.access_token, Some(&food), "25.00", "2025-06-04").await;

    let mut body = june_budget("100");
    body["category_id"] = json!(food);
    let budget = create_budget(&app, &user.access_token, body).await;
    let path = format!("/api/v1/budgets/{}", budget["id"].as_str().unwrap());

    auth_delete(&app, &user.access_token, &format!("/api/v1/categories/{food}")).await;

    let (_, body) = auth_get(&app, &user.access_token, &path).await;
    assert_eq!(body["budget"]["category"]["name"], "Food");
    assert_eq!(body["budget"]["category"]["is_deleted"], true);
    assert_eq!(body["budget"]["progress"]["spent"], "25.00");
}

#[tokio::test]
async fn test_budgets_are_scoped_to_owner() {
    let app = TestApp::new().await;
    let alice = register_user(&app).await;
    let bob = register_user(&app).await;
    let budget = create_budget(&app, &alice.access_token, june_budget("100")).await;
    let path = format!("/api/v1/budgets/{}", budget["id"].as_str().unwrap());

    let (_, body) = auth_get(&app, &bob.access_token, "/api/v1/budgets").await;
    assert!(body["budgets"].as_array().unwrap().is_empty());

    let (status, _) = auth_get(&app, &bob.access_token, &path).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = auth_patch(&app, &bob.access_token, &path, json!({ "limit": "1" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = auth_delete(&app, &bob.access_token, &path).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = auth_get(&app, &alice.access_token, "/api/v1/budgets").await;
    assert_eq!(body["budgets"].as_array().unwrap().len(), 1);
    assert!(body["budgets"][0]["progress"].is_object());
}

#[tokio::test]
async fn test_delete_budget() {
    let app = TestApp::new().await;
    let user = register_user(&app).await;
    let budget = create_budget(&app, &user.access_token, june_budget("100")).await;
    let path = format!("/api/v1/budgets/{}", budget["id"].as_str().unwrap());

    let (status, _) = auth_delete(&app, &user.access_token, &path).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = auth_get(&app, &user.access_token, &path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
