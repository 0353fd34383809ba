use std::sync::Arc;

use axum::{
    routing::{get, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::{Health, RootMessage};
use service::caballero::{CaballeroRepository, CaballeroService};

pub mod caballeros;

/// Shared handler state. The store handle is built once at startup and injected here.
#[derive(Clone)]
pub struct ServerState {
    pub caballeros: Arc<CaballeroService<dyn CaballeroRepository>>,
}

impl ServerState {
    pub fn new(repo: Arc<dyn CaballeroRepository>) -> Self {
        Self { caballeros: Arc::new(CaballeroService::new(repo)) }
    }
}

pub async fn root() -> Json<RootMessage> {
    Json(RootMessage::running())
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/caballeros/:id", put(caballeros::update_caballero))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
