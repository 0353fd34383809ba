use std::future::Future;
use std::sync::Arc;

use axum::Router;
use configs::{AppConfig, DatabaseConfig};
use service::caballero::{CaballeroRepository, MongoCaballeroRepository};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, ServerState};

/// Browsers call `PUT` cross-origin; allow any origin, method and header.
pub fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load config.toml + environment. A missing `MONGO_URI` fails here.
pub fn load_config() -> Result<AppConfig, StartupError> {
    AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))
}

/// Build the MongoDB-backed handler state once.
pub async fn build_state(cfg: &DatabaseConfig) -> Result<ServerState, StartupError> {
    let collection = models::db::connect_caballeros(cfg)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    let repo: Arc<dyn CaballeroRepository> = Arc::new(MongoCaballeroRepository::new(collection));
    Ok(ServerState::new(repo))
}

pub fn build_app(state: ServerState) -> Router {
    routes::build_router(state, build_cors())
}

/// Serve with an already validated config until `shutdown` resolves.
///
/// The caller owns the shutdown trigger so it can log it with its own
/// process context (service id, pid).
pub async fn run_with_config<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = build_state(&cfg.database).await?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(cfg.server.bind_addr()).await?;
    let addr = listener.local_addr()?;
    info!(
        %addr,
        db = %cfg.database.name,
        collection = %cfg.database.collection,
        "starting caballeros edit server"
    );
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("server drained");
    Ok(())
}
