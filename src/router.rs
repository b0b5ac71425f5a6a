use axum::{
    Router,
    body::Body,
    http::{HeaderName, Request},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    error::Error,
    handlers,
    middleware::{ip_rate_limit_middleware, jwt_auth_middleware, user_rate_limit_middleware},
    state::AppState,
};

const REQUEST_ID_HEADER: &str = "x-request-id";

async fn route_not_found() -> Error {
    Error::NotFound("Route not found".to_string())
}

/// Builds the application router with every `/api/v1` endpoint
pub fn build_router(state: AppState) -> Router {
    // Public auth endpoints, limited per client IP
    let auth_routes = Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/refresh", post(handlers::refresh))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            ip_rate_limit_middleware,
        ));

    // Layers run bottom-up: authentication first, then the per-user limit
    let protected_routes = Router::new()
        .route("/auth/logout", post(handlers::logout))
        .route(
            "/user",
            get(handlers::get_current_user)
                .patch(handlers::update_current_user)
                .delete(handlers::delete_current_user),
        )
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/categories/{id}",
            get(handlers::get_category)
                .patch(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route("/categories/{id}/restore", post(handlers::restore_category))
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route(
            "/transactions/{id}",
            get(handlers::get_transaction)
                .patch(handlers::update_transaction)
                .delete(handlers::delete_transaction),
        )
        .route(
            "/transactions/{id}/restore",
            post(handlers::restore_transaction),
        )
        .route(
            "/budgets",
            get(handlers::list_budgets).post(handlers::create_budget),
        )
        .route(
            "/budgets/{id}",
            get(handlers::get_budget)
                .patch(handlers::update_budget)
                .delete(handlers::delete_budget),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            user_rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .merge(auth_routes)
        .merge(protected_routes);

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_routes)
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        let request_id = request
                            .headers()
                            .get(REQUEST_ID_HEADER)
                            .and_then(|value| value.to_str().ok())
                            .unwrap_or("-");
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %request_id,
                        )
                    }),
                )
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(cors),
        )
        .with_state(state)
}
