mod api;
mod config;
mod origin;
mod server;
mod widget;

use crate::config::AppConfig;
use crate::server::AppState;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = AppConfig::from_env()?;
    if let Some(origin) = &config.public_origin {
        tracing::info!(%origin, "using configured widget origin");
    }

    let addr: SocketAddr = config.bind_addr;
    let state = AppState::new(config);

    tracing::info!(%addr, "starting trakoship-widget server");
    server::run(addr, state).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("trakoship_widget=info,tower_http=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
