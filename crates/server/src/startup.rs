use std::{net::SocketAddr, path::Path};

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Router over an already constructed state; used by `run` and by tests.
pub fn build_app(state: AppState, cfg: &AppConfig) -> Router {
    routes::build_router(state, build_cors(), Path::new(&cfg.storage.frontend_dir))
}

/// Public entry: prepare directories, open the store, then serve until Ctrl+C.
///
/// The document is read once before binding so a first run seeds it and a
/// corrupt file stops startup instead of failing every request.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    common::env::ensure_env(
        &cfg.storage.frontend_dir,
        &cfg.storage.data_file,
        &cfg.storage.uploads_dir,
    )
    .await?;

    let state = AppState::from_config(&cfg).await?;
    let doc = state.store.read().await?;
    info!(
        data_file = %cfg.storage.data_file,
        slides = doc.slides.len(),
        theme = %doc.global_settings.theme,
        event = "store_ready",
        "kiosk document loaded"
    );

    let app = build_app(state, &cfg);
    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting kiosk server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(event = "shutdown_signal", "received Ctrl+C, draining connections"),
        // no signal handler available: serve until the process is killed
        Err(_) => std::future::pending::<()>().await,
    }
}
