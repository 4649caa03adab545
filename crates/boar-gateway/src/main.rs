use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

mod app;
mod http;
mod jobs;
mod tools;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boar_gateway=info,tower_http=debug".into()),
        )
        .init();

    // load config: explicit path > BOAR_CONFIG env > ./boar.toml
    let config_path = std::env::var("BOAR_CONFIG").ok();
    let config = boar_core::BoarConfig::load(config_path.as_deref())?;

    let host = config.server.host.clone();
    let port = config.server.port;

    let state = Arc::new(app::AppState::new(config)?);
    state.erp.ensure_connected().await?;
    state.register_default_jobs().await;
    state.scheduler.start();
    let router = app::build_router(state.clone());

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!(%addr, git_sha = env!("BOAR_GIT_SHA"), "BOAR gateway listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
