use fintrack::{AppState, build_router, database, load_config, workers::session_cleanup_worker};
use std::net::SocketAddr;
use tokio::{net::TcpListener, sync::broadcast};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fintrack=info,tower_http=info")),
        )
        .init();

    let config = load_config()?;
    tracing::info!("Loaded configuration: {}", config);

    let pool = database::connect(&config.database).await?;
    database::migrate(&pool).await?;
    tracing::info!("Database migrations applied");

    let bind_address = config.server.bind_address();
    let cleanup_interval = config.workers.session_cleanup_interval_seconds;
    let state = AppState::new(pool.clone(), config);

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let worker = tokio::spawn(session_cleanup_worker(
        pool,
        state.rate_limiter.clone(),
        cleanup_interval,
        shutdown_tx.subscribe(),
    ));

    let app = build_router(state);
    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!("Listening on {}", bind_address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    let _ = shutdown_tx.send(());
    let _ = worker.await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
