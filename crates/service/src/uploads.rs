use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::ServiceError;

/// URL prefix under which uploaded images are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads/";

/// Stores uploaded slide and watermark images under one directory with
/// generated names, and removes them again once nothing references them.
#[derive(Debug, Clone)]
pub struct UploadService {
    dir: PathBuf,
    max_bytes: usize,
    allowed_extensions: Vec<String>,
}

impl UploadService {
    pub fn new<P: Into<PathBuf>>(dir: P, max_bytes: usize, allowed_extensions: Vec<String>) -> Self {
        Self { dir: dir.into(), max_bytes, allowed_extensions }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Save `bytes` under a fresh name keeping the (lower-cased) extension of
    /// `original_name`. Returns the public URL path.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, ServiceError> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .filter(|e| self.allowed_extensions.iter().any(|a| a == e))
            .ok_or_else(|| {
                ServiceError::Validation(format!(
                    "unsupported image type {original_name:?}; allowed: {}",
                    self.allowed_extensions.join(", ")
                ))
            })?;
        if bytes.is_empty() {
            return Err(ServiceError::Validation("uploaded file is empty".into()));
        }
        if bytes.len() > self.max_bytes {
            return Err(ServiceError::PayloadTooLarge(format!(
                "{} bytes exceeds limit of {} bytes",
                bytes.len(),
                self.max_bytes
            )));
        }
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ServiceError::Io(format!("create {}: {e}", self.dir.display())))?;
        let name = format!("{}.{ext}", Uuid::new_v4().simple());
        let target = self.dir.join(&name);
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| ServiceError::Io(format!("write {}: {e}", target.display())))?;
        info!(file = %name, bytes = bytes.len(), event = "upload_saved", "image uploaded");
        Ok(format!("{UPLOADS_URL_PREFIX}{name}"))
    }

    /// Whether `url` points at a file this service manages.
    pub fn is_managed(url: &str) -> bool {
        Self::file_name(url).is_some()
    }

    /// Delete the file behind `url`. Returns `false` for foreign URLs and files already gone.
    pub async fn remove(&self, url: &str) -> Result<bool, ServiceError> {
        let Some(name) = Self::file_name(url) else { return Ok(false) };
        let target = self.dir.join(name);
        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                debug!(file = %name, event = "upload_removed", "unreferenced image removed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ServiceError::Io(format!("remove {}: {e}", target.display()))),
        }
    }

    // plain file name only: no separators, no dot-dot
    fn file_name(url: &str) -> Option<&str> {
        let name = url.strip_prefix(UPLOADS_URL_PREFIX)?;
        let ok = !name.is_empty()
            && !name.starts_with('.')
            && !name.contains(|c: char| c == '/' || c == '\\')
            && name != "..";
        ok.then_some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(tag: &str) -> UploadService {
        let dir = std::env::temp_dir().join(format!("kiosk_uploads_{}_{}", tag, Uuid::new_v4()));
        UploadService::new(dir, 16, vec!["png".into(), "jpg".into()])
    }

    #[tokio::test]
    async fn save_and_remove_round_trip() -> Result<(), anyhow::Error> {
        let svc = service("save");
        let url = svc.save("Photo.PNG", b"\x89PNG....").await?;
        assert!(url.starts_with(UPLOADS_URL_PREFIX));
        assert!(url.ends_with(".png"));
        let name = url.trim_start_matches(UPLOADS_URL_PREFIX);
        assert_eq!(tokio::fs::read(svc.dir().join(name)).await?, b"\x89PNG....");

        assert!(svc.remove(&url).await?);
        assert!(!svc.remove(&url).await?);
        let _ = tokio::fs::remove_dir_all(svc.dir()).await;
        Ok(())
    }

    #[tokio::test]
    async fn rejects_bad_type_empty_and_oversized() {
        let svc = service("reject");
        assert!(matches!(svc.save("notes.txt", b"x").await, Err(ServiceError::Validation(_))));
        assert!(matches!(svc.save("noext", b"x").await, Err(ServiceError::Validation(_))));
        assert!(matches!(svc.save("a.png", b"").await, Err(ServiceError::Validation(_))));
        assert!(matches!(
            svc.save("a.jpg", &[0u8; 17]).await,
            Err(ServiceError::PayloadTooLarge(_))
        ));
    }

    #[test]
    fn only_plain_names_under_prefix_are_managed() {
        assert!(UploadService::is_managed("/uploads/abc.png"));
        assert!(!UploadService::is_managed("https://cdn.example.com/a.png"));
        assert!(!UploadService::is_managed("/uploads/../data/data.json"));
        assert!(!UploadService::is_managed("/uploads/.hidden"));
        assert!(!UploadService::is_managed("/uploads/"));
    }
}
