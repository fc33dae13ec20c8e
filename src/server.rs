//! Router assembly and the HTTPS listener.

use crate::config::TlsConfig;
use crate::handlers::{health_handler, index_handler, profile_handler, AppState};
use crate::views::STATIC_ROUTE;
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use std::net::SocketAddr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Grace period for in-flight requests once shutdown starts.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/profile", get(profile_handler))
        .route("/health", get(health_handler))
        .nest_service(STATIC_ROUTE, ServeDir::new(&state.static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `app` over HTTPS until `shutdown` is cancelled.
pub async fn serve_tls(
    app: Router,
    addr: SocketAddr,
    tls: &TlsConfig,
    shutdown: CancellationToken,
) -> Result<()> {
    let rustls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
        .await
        .with_context(|| {
            format!(
                "failed to load TLS certificate {} and key {}",
                tls.cert_path.display(),
                tls.key_path.display()
            )
        })?;

    let handle = Handle::new();

    tokio::spawn({
        let handle = handle.clone();
        async move {
            shutdown.cancelled().await;
            info!("Shutdown signal received, draining connections...");
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    info!("Server running on https://localhost:{}", addr.port());

    axum_server::bind_rustls(addr, rustls_config)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .context("HTTPS server failed")?;

    Ok(())
}
