use crate::middleware::rate_limit::RateLimiter;
use crate::services::sessions;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, warn};

/// Background worker that periodically purges dead sessions
///
/// Removes expired sessions and sessions still held by soft-deleted
/// accounts, then drops closed rate limit windows.
pub async fn session_cleanup_worker(
    pool: sqlx::PgPool,
    rate_limiter: Arc<RateLimiter>,
    interval_seconds: u64,
    mut shutdown_rx: tokio::sync::broadcast::Receiver<()>,
) {
    let mut cleanup_interval = interval(Duration::from_secs(interval_seconds.max(1)));
    info!("Session cleanup worker started (runs every {} seconds)", interval_seconds);

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Session cleanup worker shutting down");
                break;
            }
            _ = cleanup_interval.tick() => {
                rate_limiter.prune().await;

                let mut conn = match pool.acquire().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        error!("Failed to acquire database connection for cleanup: {}", e);
                        continue;
                    }
                };

                match sessions::cleanup_sessions(&mut conn).await {
                    Ok(count) => {
                        if count > 0 {
                            info!("Cleaned up {} dead sessions", count);
                        }
                    }
                    Err(e) => {
                        warn!("Failed to clean up sessions: {}", e);
                    }
                }
            }
        }
    }

    info!("Session cleanup worker stopped");
}
