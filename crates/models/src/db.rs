use std::time::Duration;

use configs::DatabaseConfig;
use mongodb::{options::ClientOptions, Client, Collection, Database};
use tracing::info;

use crate::caballero::Caballero;
use crate::errors::ModelError;

/// Build the MongoDB client once and return the configured database handle.
///
/// The driver connects lazily; this only parses the URI and sets up the pool.
pub async fn connect(cfg: &DatabaseConfig) -> Result<Database, ModelError> {
    let mut opts = ClientOptions::parse(&cfg.uri).await?;
    opts.app_name = cfg.app_name.clone();
    opts.max_pool_size = Some(cfg.max_pool_size);
    opts.min_pool_size = Some(cfg.min_pool_size);
    opts.connect_timeout = Some(Duration::from_secs(cfg.connect_timeout_secs));
    opts.server_selection_timeout = Some(Duration::from_secs(cfg.server_selection_timeout_secs));

    let client = Client::with_options(opts)?;
    info!(db = %cfg.name, max_pool_size = cfg.max_pool_size, "mongodb_client_ready");
    Ok(client.database(&cfg.name))
}

/// Typed handle on the knights collection.
pub fn caballeros(db: &Database, cfg: &DatabaseConfig) -> Collection<Caballero> {
    db.collection::<Caballero>(&cfg.collection)
}

pub async fn connect_caballeros(cfg: &DatabaseConfig) -> Result<Collection<Caballero>, ModelError> {
    let db = connect(cfg).await?;
    Ok(caballeros(&db, cfg))
}
