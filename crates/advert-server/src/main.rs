use std::net::SocketAddr;
use std::path::PathBuf;

use tower_http::trace::TraceLayer;
use tracing::info;

use advert_api::{ApiConfig, AppStateInner};
use advert_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "advert=debug,advert_api=debug,advert_db=info,tower_http=debug".into()
            }),
        )
        .init();

    // Config
    let db_path: PathBuf = std::env::var("ADVERT_DB_PATH")
        .unwrap_or_else(|_| "advertisements.db".into())
        .into();
    let host = std::env::var("ADVERT_HOST").unwrap_or_else(|_| "127.0.0.1".into());
    let port: u16 = std::env::var("ADVERT_PORT")
        .unwrap_or_else(|_| "8000".into())
        .parse()?;
    let api_config = ApiConfig::from_env()?;

    // Init database (runs migrations)
    let db = Database::open(&db_path)?;

    let state = AppStateInner::new(db, api_config.clone());

    let app = advert_api::router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Advertisement server listening on {}", addr);
    info!(
        "Conflicts answer {}, reads return the {:?} view, ownership checks {}",
        api_config.conflict_status.status_code(),
        api_config.read_view,
        if api_config.enforce_ownership { "on" } else { "off" }
    );

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
                Ok(signal) => signal,
                Err(e) => {
                    tracing::warn!("Failed to install SIGTERM handler: {}", e);
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
