pub mod config;
pub mod origin;
mod routes;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use std::sync::Arc;

use anyhow::Result;
use kanban_db::SqliteDatabase;
use kanban_service::LocalService;
use tokio::net::TcpListener;
use tracing::{error, info};

use config::ServerConfig;
use origin::OriginAllowList;

pub use routes::{build_router, AppState, InnerAppState};

/// Open the database and blob store named by `config` and wire them into
/// the shared application state.
pub fn build_state(config: &ServerConfig) -> Result<AppState> {
    let db = Arc::new(SqliteDatabase::open(&config.db_config())?);
    let store = kanban_store::create_store(&config.store_config())?;
    Ok(Arc::new(InnerAppState {
        service: LocalService::new(db, store),
        origins: OriginAllowList::new(&config.allowed_origins),
        max_upload_bytes: config.max_upload_bytes,
    }))
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let app = routes::build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested, draining connections"),
        Err(e) => {
            error!("cannot listen for ctrl-c, running until killed: {e}");
            std::future::pending::<()>().await;
        }
    }
}
