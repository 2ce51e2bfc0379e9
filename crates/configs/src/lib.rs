use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `worker_threads = None` leaves the tokio default (one worker per core).
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: None }
    }
}

/// Where the document, uploaded images, frontend assets and theme registry live.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: String,
    #[serde(default = "default_themes_file")]
    pub themes_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            uploads_dir: default_uploads_dir(),
            frontend_dir: default_frontend_dir(),
            themes_file: default_themes_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { max_bytes: default_max_bytes(), allowed_extensions: default_allowed_extensions() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_data_file() -> String { "data/data.json".into() }
fn default_uploads_dir() -> String { "uploads".into() }
fn default_frontend_dir() -> String { "frontend".into() }
fn default_themes_file() -> String { "themes.toml".into() }
fn default_max_bytes() -> usize { 10 * 1024 * 1024 }
fn default_allowed_extensions() -> Vec<String> {
    ["png", "jpg", "jpeg", "gif", "webp"].iter().map(|s| s.to_string()).collect()
}
fn default_log_format() -> String { "compact".into() }

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml`, or fall back to defaults overlaid with environment variables
    /// (`SERVER_HOST`, `SERVER_PORT`, `KIOSK_DATA_FILE`) when the file is missing.
    pub fn load_or_env() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        // a present but broken file is an error, not a reason to run on defaults
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path).map_err(|e| anyhow!("invalid config {path}: {e}"))?
        } else {
            Self::from_env()
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        if let Ok(file) = std::env::var("KIOSK_DATA_FILE") {
            cfg.storage.data_file = file;
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        self.uploads.normalize()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("storage.data_file", &self.data_file),
            ("storage.uploads_dir", &self.uploads_dir),
            ("storage.frontend_dir", &self.frontend_dir),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("{key} must not be empty"));
            }
        }
        Ok(())
    }
}

impl UploadConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.max_bytes == 0 {
            return Err(anyhow!("uploads.max_bytes must be > 0"));
        }
        self.allowed_extensions = self
            .allowed_extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        if self.allowed_extensions.is_empty() {
            return Err(anyhow!("uploads.allowed_extensions must list at least one extension"));
        }
        Ok(())
    }
}
