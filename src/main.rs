use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;

use observatory::config::AppConfig;
use observatory::db::store::{DocumentStore, MongoDocumentStore};
use observatory::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "observatory=info,tower_http=info".into()),
        )
        .init();

    tracing::info!("Starting Observatory API...");

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let (mongo_uri, mongo_db_name) = config.store_settings()?;

    let store = MongoDocumentStore::connect(mongo_uri, mongo_db_name).await?;
    match store.ping().await {
        Ok(()) => tracing::info!("Connected to MongoDB database '{}'", mongo_db_name),
        Err(e) => tracing::warn!("MongoDB is not reachable yet, continuing: {e}"),
    }

    let addr = config.bind_address();
    let state = AppState::new(Arc::new(store), config);
    let app = observatory::router::build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
