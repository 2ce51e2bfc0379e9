use std::process::ExitCode;

use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn main() -> ExitCode {
    // .env first so RUST_LOG, CONFIG_PATH and SERVER_* are visible
    dotenv().ok();

    let cfg = match configs::AppConfig::load_or_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(service = "kiosk", event = "config_invalid", error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    common::utils::logging::init_logging(&cfg.logging.format);
    info!(service = "kiosk", event = "logger_init", format = %cfg.logging.format, "tracing subscriber initialized");

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "kiosk",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let worker_threads = cfg.server.worker_threads;
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "kiosk", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "kiosk",
        event = "start",
        %service_id,
        pid,
        version,
        threads = ?worker_threads,
        "kiosk server starting"
    );

    // server::run owns graceful shutdown; it returns once Ctrl+C has drained connections
    match rt.block_on(server::run(cfg)) {
        Ok(()) => {
            info!(service = "kiosk", event = "stop", %service_id, pid, "kiosk server stopped normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "kiosk", event = "run_failed", error = %e, "kiosk server exited with error");
            ExitCode::FAILURE
        }
    }
}
