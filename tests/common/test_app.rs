use fintrack::{AppState, Config, build_router, load_config};
use reqwest::{Client, redirect::Policy};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::common::database::init_test_db;

/// Overrides applied on top of the loaded config.
#[derive(Debug, Clone)]
pub struct TestAppOptions {
    pub auth_per_minute: u32,
    pub api_per_minute: u32,
}

impl Default for TestAppOptions {
    fn default() -> Self {
        // High enough that parallel tests never trip the limiter
        Self {
            auth_per_minute: 1_000,
            api_per_minute: 10_000,
        }
    }
}

/// HTTP test application wrapper
///
/// Runs the full router on a random port. Each test gets its own server,
/// and with it its own rate limiter.
pub struct TestApp {
    /// Server base URL (e.g., "http://127.0.0.1:54321")
    pub address: String,
    /// HTTP client for making requests
    pub client: Client,
    /// Application config
    pub config: Config,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_options(TestAppOptions::default()).await
    }

    /// Creates a test app with custom rate limits
    ///
    /// # How it works:
    /// 1. Loads config and applies the overrides
    /// 2. Connects to the database and applies migrations
    /// 3. Binds to port 0 (OS assigns random available port)
    /// 4. Starts the server in a background task with peer addresses enabled
    pub async fn with_options(options: TestAppOptions) -> Self {
        let mut config = load_config().expect("Failed to load config");
        config.rate_limit.auth_per_minute = options.auth_per_minute;
        config.rate_limit.api_per_minute = options.api_per_minute;

        let pool = init_test_db().await;
        let app = build_router(AppState::new(pool, config.clone()));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{port}");

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            address,
            client,
            config,
        }
    }

    /// Get the full URL for an API endpoint
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}
