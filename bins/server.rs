use dotenvy::dotenv;
use tracing::{error, info, warn};
use uuid::Uuid;

fn init_logging() {
    // 提前加载 .env，使得 RUST_LOG / MONGO_URI 等环境变量生效
    dotenv().ok();
    common::utils::logging::init_logging_from_env();
    info!(service = "caballeros-edit", event = "logger_init", "tracing subscriber initialized");
}

/// Resolves on Ctrl+C and records who received it.
async fn shutdown_signal(service_id: Uuid, pid: u32) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(service = "caballeros-edit", %service_id, pid, error = %e, "cannot listen for Ctrl+C; shutdown only on process exit");
        std::future::pending::<()>().await;
    }
    info!(
        service = "caballeros-edit",
        event = "shutdown_signal",
        %service_id,
        pid,
        "received Ctrl+C, draining connections"
    );
}

fn main() -> std::process::ExitCode {
    init_logging();

    // 基础服务上下文（不含敏感信息）
    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "caballeros-edit",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    // Missing MONGO_URI stops the process here, before anything is bound.
    let cfg = match server::startup::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "caballeros-edit", event = "config_invalid", error = %e, "refusing to start");
            return std::process::ExitCode::FAILURE;
        }
    };

    let worker_threads = cfg.server.worker_threads;
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "caballeros-edit", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "caballeros-edit",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "server service starting"
    );

    rt.block_on(async move {
        match server::run_with_config(cfg, shutdown_signal(service_id, pid)).await {
            Ok(()) => {
                info!(service = "caballeros-edit", event = "stop", %service_id, pid, "server stopped normally");
                std::process::ExitCode::SUCCESS
            }
            Err(e) => {
                error!(service = "caballeros-edit", event = "run_failed", %service_id, pid, error = %e, "server returned error");
                std::process::ExitCode::FAILURE
            }
        }
    })
}
