use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use kanban_server::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();
    let state = kanban_server::build_state(&config)?;

    let addr = config.addr();
    let listener = TcpListener::bind(addr).await?;
    info!("kanban-server listening on http://{addr}");
    info!("allowed origins: {}", config.allowed_origins.join(", "));

    kanban_server::serve(listener, state).await?;
    info!("kanban-server stopped");
    Ok(())
}
