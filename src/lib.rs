pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod points;
pub mod routes;
pub mod state;
pub mod store;
pub mod validate;

pub use config::{CliArgs, ServerConfig};
pub use error::ServiceError;
pub use logging::{LoggingConfig, init_logging};
pub use model::{Item, Receipt, ReceiptId};
pub use points::{PointsBreakdown, points_breakdown, score_receipt};
pub use routes::build_router;
pub use state::AppState;
pub use store::{MemoryReceiptStore, ReceiptStore};
pub use validate::{ValidationError, validate_receipt};

use anyhow::Result;
use std::{future::IntoFuture, sync::Arc};
use tokio::net::TcpListener;

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let config = Arc::new(config);
    let state = Arc::new(AppState::new(config.clone()));

    tracing::info!(
        bind = %config.http_bind_address,
        body_limit = config.max_body_bytes,
        "starting receipt points service",
    );

    let router = routes::build_router(state);

    let listener = TcpListener::bind(config.http_bind_address).await?;
    let actual_addr = listener.local_addr()?;
    tracing::info!(bind = %actual_addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .into_future()
        .await
        .map_err(anyhow::Error::from)
}

/// Resolves when SIGINT or, on unix, SIGTERM arrives. In-memory state is
/// simply dropped; there is nothing to flush.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received SIGINT (Ctrl+C), initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("received SIGTERM, initiating graceful shutdown");
        },
    }
}
