#![cfg(test)]
use configs::DatabaseConfig;
use models::Caballero;
use mongodb::bson::oid::ObjectId;
use mongodb::Collection;

/// Fresh, uniquely named collection on the MongoDB from `MONGO_URI`.
/// Returns `None` (test skips) when no database is configured.
pub async fn caballeros_collection() -> Option<Collection<Caballero>> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let Ok(uri) = std::env::var("MONGO_URI") else {
        eprintln!("MONGO_URI missing; skip mongo-backed test");
        return None;
    };
    let cfg = DatabaseConfig {
        uri,
        name: std::env::var("MONGO_DB").unwrap_or_else(|_| "caballerosdb_test".into()),
        collection: format!("caballeros_test_{}", ObjectId::new().to_hex()),
        ..DatabaseConfig::default()
    };
    match models::db::connect_caballeros(&cfg).await {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("skip: cannot connect to mongo: {}", e);
            None
        }
    }
}
