use anyhow::{Context, Result};
use clap::Parser;
use followcam_relay::{RelayConfig, SignalingService, router};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = RelayConfig::parse();

    // 1. Логирование в консоль, уровень из --log-level / RUST_LOG
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // 2. Релей и WebSocket сервис вокруг него
    let service = SignalingService::start();
    let app = router(service);

    // 3. Слушаем порт
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("FollowCam relay listening on ws://{}/ws", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
