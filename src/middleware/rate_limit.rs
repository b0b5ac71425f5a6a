//! Fixed-window request limiting.
//!
//! Unauthenticated auth routes are keyed by client IP, everything behind
//! the JWT middleware by user id. Windows last one minute.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    error::{Error, Result},
    middleware::auth::AuthenticatedUser,
    state::AppState,
};

const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitKey {
    Ip(IpAddr),
    User(Uuid),
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Per-key request counters shared by every request.
pub struct RateLimiter {
    windows: scc::HashMap<RateLimitKey, Window>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            windows: scc::HashMap::new(),
        }
    }

    /// Counts one request for `key`, failing once `limit` requests have been
    /// seen in the current window.
    pub async fn check(&self, key: RateLimitKey, limit: u32) -> Result<()> {
        self.check_at(key, limit, Instant::now()).await
    }

    async fn check_at(&self, key: RateLimitKey, limit: u32, now: Instant) -> Result<()> {
        let mut entry = self
            .windows
            .entry_async(key)
            .await
            .or_insert(Window { started: now, count: 0 });
        let window = entry.get_mut();

        if now.duration_since(window.started) >= WINDOW {
            window.started = now;
            window.count = 0;
        }

        if window.count >= limit {
            let elapsed = now.duration_since(window.started);
            let retry_after_secs = WINDOW.saturating_sub(elapsed).as_secs().max(1);
            return Err(Error::RateLimited { retry_after_secs });
        }

        window.count += 1;
        Ok(())
    }

    /// Drops windows that have already closed.
    pub async fn prune(&self) {
        let now = Instant::now();
        self.windows
            .retain_async(|_, window| now.duration_since(window.started) < WINDOW)
            .await;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Limits unauthenticated auth endpoints per client IP.
pub async fn ip_rate_limit_middleware(State(state): State<AppState>, request: Request, next: Next) -> Result<Response> {
    let key = RateLimitKey::Ip(client_ip(&request));
    state
        .rate_limiter
        .check(key, state.config.rate_limit.auth_per_minute)
        .await?;
    Ok(next.run(request).await)
}

/// Limits authenticated endpoints per user. Must run after the JWT middleware.
pub async fn user_rate_limit_middleware(State(state): State<AppState>, request: Request, next: Next) -> Result<Response> {
    let user_id = request
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|user| user.id)
        .ok_or_else(|| Error::Authentication("Not authenticated".to_string()))?;

    state
        .rate_limiter
        .check(RateLimitKey::User(user_id), state.config.rate_limit.api_per_minute)
        .await?;
    Ok(next.run(request).await)
}
