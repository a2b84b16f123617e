//! Axum server setup and routing

pub mod error;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::handlers;

/// Build the router over the given state
pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route(
            "/convert/file",
            post(handlers::convert_file).layer(upload_limit),
        )
        .route("/convert/youtube", post(handlers::convert_url))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the web server and run until a shutdown signal arrives
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    state.store.ensure_directories()?;
    info!(
        uploads = %state.store.uploads_dir().display(),
        output = %state.store.output_dir().display(),
        "Staging directories ready"
    );

    let app = build_router(state);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.bind_address()))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(%addr, "HTTP server listening");
    println!("\n🚀 video2mp3 listening on http://{}\n", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("video2mp3 stopped");
    Ok(())
}

/// Resolves when SIGINT (Ctrl-C) or SIGTERM is received
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
