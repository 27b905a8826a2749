use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use herald_devserver::{NotificationBook, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "herald_devserver=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let host = std::env::var("HERALD_DEV_HOST").unwrap_or_else(|_| "127.0.0.1".into());
    let port: u16 = std::env::var("HERALD_DEV_PORT")
        .unwrap_or_else(|_| "3400".into())
        .parse()?;
    let failure_rate: f64 = std::env::var("HERALD_DEV_FAILURE_RATE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.0);
    let seed_count: usize = std::env::var("HERALD_DEV_SEED_COUNT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(25);

    let book = Arc::new(NotificationBook::new(failure_rate));

    // Optional demo inbox
    if let Ok(raw) = std::env::var("HERALD_DEV_SEED") {
        match raw.parse::<Uuid>() {
            Ok(user_id) => {
                book.seed(user_id, seed_count).await;
                info!("Seeded {} notifications for {}", seed_count, user_id);
            }
            Err(e) => warn!("Ignoring HERALD_DEV_SEED='{}': {}", raw, e),
        }
    }
    if failure_rate > 0.0 {
        info!("Failure injection on: {:.0}% of mutations return 503", failure_rate * 100.0);
    }

    let app = router(book);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Herald dev notification store listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    warn!("Could not install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    info!("Received Ctrl+C, shutting down...");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
