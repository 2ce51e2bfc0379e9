//! Theme registry
//!
//! Declared list of display themes, loaded from a TOML resource:
//!
//! ```toml
//! [[themes]]
//! id = "default"
//! name = "Default"
//! category = "light"
//! ```
//!
//! When the file does not exist the built-in list is used.

use std::path::Path;

use models::{document::DEFAULT_THEME, Theme, ThemeCategory};
use serde::Deserialize;
use tracing::info;

use crate::errors::ServiceError;

#[derive(Debug, Deserialize)]
struct ThemeFile {
    #[serde(default)]
    themes: Vec<Theme>,
}

#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    themes: Vec<Theme>,
}

impl ThemeRegistry {
    pub fn builtin() -> Self {
        use ThemeCategory::*;
        Self {
            themes: vec![
                Theme::new(DEFAULT_THEME, "Default", Light),
                Theme::new("dark", "Dark", Dark),
                Theme::new("midnight", "Midnight", Dark),
                Theme::new("ocean", "Ocean", Colorful),
                Theme::new("sunset", "Sunset", Colorful),
                Theme::new("forest", "Forest", Colorful),
                Theme::new("minimal", "Minimal", Light),
            ],
        }
    }

    /// Load from `path`; a missing file falls back to [`ThemeRegistry::builtin`].
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let registry = Self::from_toml(&content)?;
                info!(path = %path.display(), themes = registry.themes.len(), "theme registry loaded");
                Ok(registry)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "theme registry file not found; using built-in themes");
                Ok(Self::builtin())
            }
            Err(e) => Err(ServiceError::Io(format!("read {}: {e}", path.display()))),
        }
    }

    /// Parse and check ids: non-empty, unique, and `default` always present.
    pub fn from_toml(content: &str) -> Result<Self, ServiceError> {
        let file: ThemeFile = toml::from_str(content)
            .map_err(|e| ServiceError::Validation(format!("invalid theme registry: {e}")))?;
        let mut themes: Vec<Theme> = Vec::with_capacity(file.themes.len() + 1);
        for theme in file.themes {
            let id = theme.id.trim();
            if id.is_empty() {
                return Err(ServiceError::Validation("theme id must not be empty".into()));
            }
            if themes.iter().any(|t| t.id == id) {
                return Err(ServiceError::Validation(format!("duplicate theme id {id:?}")));
            }
            themes.push(Theme { id: id.to_string(), ..theme });
        }
        if !themes.iter().any(|t| t.id == DEFAULT_THEME) {
            themes.insert(0, Theme::new(DEFAULT_THEME, "Default", ThemeCategory::Light));
        }
        Ok(Self { themes })
    }

    pub fn list(&self) -> &[Theme] {
        &self.themes
    }

    pub fn get(&self, id: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}
