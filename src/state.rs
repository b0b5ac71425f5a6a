use crate::{config::Config, database::DbPool, middleware::rate_limit::RateLimiter};
use std::sync::Arc;

/// Application state shared across all HTTP handlers
///
/// Holds the resources every request needs: the database pool, the loaded
/// configuration and the rate limiter windows.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool for accessing the database
    pub pool: DbPool,
    /// Configuration loaded once at startup
    pub config: Arc<Config>,
    /// Per-minute request counters
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Create a new AppState instance
    ///
    /// # Arguments
    /// * `pool` - Database connection pool
    /// * `config` - Application configuration
    pub fn new(pool: DbPool, config: Config) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            rate_limiter: Arc::new(RateLimiter::new()),
        }
    }
}
