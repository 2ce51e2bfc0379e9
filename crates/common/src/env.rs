//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the data and uploads directories exist; warn when the frontend is missing.
///
/// The data directory is the parent of the document file. Failure to create
/// either writable directory aborts startup.
pub async fn ensure_env(frontend_dir: &str, data_file: &str, uploads_dir: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(frontend_dir).await.is_err() {
        warn!(%frontend_dir, "frontend assets directory not found; display and admin pages may 404");
    }
    if let Some(data_dir) = Path::new(data_file).parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
    }
    tokio::fs::create_dir_all(uploads_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {uploads_dir}: {e}"))?;
    info!(%data_file, %uploads_dir, event = "env_ready", "runtime directories ready");
    Ok(())
}
