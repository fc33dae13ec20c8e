use anyhow::{Context, Result};
use profile_verifier::{build_router, serve_tls, AppConfig, AppState, HttpVerificationClient};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    // Load environment variables
    dotenv::dotenv().ok();

    // Check if we should enable tokio-console
    if std::env::var("TOKIO_CONSOLE").is_ok() {
        console_subscriber::init();
        info!("tokio-console enabled on port 6669");
    } else {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,profile_verifier=debug"));
        fmt().with_env_filter(env_filter).with_target(true).init();
    }

    let config = AppConfig::from_env().context("Invalid configuration")?;
    info!(
        "Loaded configuration for application {} (static dir {})",
        config.application_id,
        config.static_dir.display()
    );

    let client = HttpVerificationClient::new(config.verification.clone())
        .context("Failed to create verification client")?;
    let state = AppState::new(&config, Arc::new(client));
    let app = build_router(state);

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            capture_sigterm().await;
            shutdown.cancel();
        }
    });

    serve_tls(app, config.bind_addr(), &config.tls, shutdown).await?;

    info!("Clean shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM.
async fn capture_sigterm() {
    #[cfg(unix)]
    let term = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let term = std::future::pending::<()>();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = term => {}
    };
}
