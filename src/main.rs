//! Server entry point: reads settings, builds the lazily connecting pool and serves the API.

use constructora_api::{app, connect_lazy, resolve, validate, validate_model, AppState, Config};
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("constructora_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    validate(&config)?;
    let model = resolve(&config.database);
    validate_model(&model)?;

    let pool = connect_lazy(&config.database)?;
    let state = AppState::new(pool.clone(), model);
    let router = app(state, &config.server);

    let listener = TcpListener::bind(config.server.bind_addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        schema = %config.database.schema,
        "listening"
    );
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::warn!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::warn!("received SIGTERM, shutting down"),
    }
}
