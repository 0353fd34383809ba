use std::net::SocketAddr;
use std::sync::Arc;

use configs::DatabaseConfig;
use models::Caballero;
use mongodb::bson::oid::ObjectId;
use mongodb::Collection;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::json;
use service::caballero::repository::mock::MockCaballeroRepository;
use service::caballero::CaballeroRepository;
use tokio::net::TcpListener;

use server::routes::ServerState;
use server::startup::{build_app, build_state};

struct TestApp {
    base_url: String,
}

async fn serve(state: ServerState) -> anyhow::Result<TestApp> {
    let app = build_app(state);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

/// Server backed by a throwaway collection on `MONGO_URI`; `None` skips the test.
async fn start_mongo_server() -> anyhow::Result<Option<(TestApp, Collection<Caballero>)>> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(None);
    }
    let Ok(uri) = std::env::var("MONGO_URI") else {
        eprintln!("MONGO_URI missing; skip e2e tests. Provide .env or env var.");
        return Ok(None);
    };
    let cfg = DatabaseConfig {
        uri,
        name: std::env::var("MONGO_DB").unwrap_or_else(|_| "caballerosdb_test".into()),
        collection: format!("caballeros_e2e_{}", ObjectId::new().to_hex()),
        ..DatabaseConfig::default()
    };
    let collection = models::db::connect_caballeros(&cfg).await?;
    let app = serve(build_state(&cfg).await?).await?;
    Ok(Some((app, collection)))
}

#[tokio::test]
async fn e2e_root_and_update_over_http() -> anyhow::Result<()> {
    let repo = Arc::new(MockCaballeroRepository::default());
    let id = repo.insert(Caballero { nombre: Some("Shiryu".into()), ..Default::default() });
    let dyn_repo: Arc<dyn CaballeroRepository> = repo.clone();
    let app = serve(ServerState::new(dyn_repo)).await?;
    let c = reqwest::Client::new();

    let res = c.get(format!("{}/", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let res = c
        .put(format!("{}/caballeros/{}", app.base_url, id.to_hex()))
        .json(&json!({"constelacion": "Dragón", "extra": 1}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["cambios"], json!({"constelacion": "Dragón"}));
    Ok(())
}

#[tokio::test]
async fn e2e_mongo_update_flow() -> anyhow::Result<()> {
    let Some((app, collection)) = start_mongo_server().await? else { return Ok(()) };
    let c = reqwest::Client::new();

    let knight = Caballero {
        id: Some(ObjectId::new()),
        nombre: Some("Hyoga".into()),
        constelacion: Some("Cisne".into()),
        edad: Some(14),
        url_imagen: None,
        altura: Some(1.73),
    };
    let id = knight.id.unwrap_or_else(ObjectId::new);
    collection.insert_one(&knight).await?;

    let url = format!("{}/caballeros/{}", app.base_url, id.to_hex());
    let res = c.put(&url).json(&json!({"nombre": "Seiya"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["cambios"], json!({"nombre": "Seiya"}));

    let stored = collection.find_one(mongodb::bson::doc! { "_id": id }).await?.expect("stored knight");
    assert_eq!(stored, Caballero { nombre: Some("Seiya".into()), ..knight.clone() });

    // same change again: still matched, document unchanged
    let res = c.put(&url).json(&json!({"nombre": "Seiya"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let again = collection.find_one(mongodb::bson::doc! { "_id": id }).await?;
    assert_eq!(again, Some(stored));

    let missing = format!("{}/caballeros/{}", app.base_url, ObjectId::new().to_hex());
    let res = c.put(&missing).json(&json!({"nombre": "Seiya"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let res = c.put(&url).json(&json!({})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    collection.drop().await?;
    Ok(())
}
