#![cfg(test)]
use std::path::{Path, PathBuf};

/// Fresh `data.json` path inside its own temp directory.
pub fn temp_data_file(tag: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("kiosk_{}_{}", tag, uuid::Uuid::new_v4()))
        .join("data.json")
}

/// Remove the temp directory created for `path`.
pub async fn cleanup(path: &Path) {
    if let Some(dir) = path.parent() {
        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}
