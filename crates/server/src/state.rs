use std::sync::Arc;

use configs::AppConfig;
use models::Document;
use service::{
    settings::SettingsService,
    slides::SlideService,
    storage::{JsonDocumentStore, KioskStore},
    themes::ThemeRegistry,
    uploads::UploadService,
};

/// Everything the handlers need, built once at startup and shared by `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KioskStore>,
    pub slides: Arc<SlideService>,
    pub settings: Arc<SettingsService>,
    pub themes: Arc<ThemeRegistry>,
    pub uploads: Arc<UploadService>,
}

impl AppState {
    pub fn new(store: Arc<dyn KioskStore>, themes: ThemeRegistry, uploads: UploadService) -> Self {
        let themes = Arc::new(themes);
        let uploads = Arc::new(uploads);
        let slides = SlideService::new(Arc::clone(&store)).with_uploads(Arc::clone(&uploads));
        let settings = SettingsService::new(Arc::clone(&store), Arc::clone(&themes));
        Self {
            store,
            slides: Arc::new(slides),
            settings: Arc::new(settings),
            themes,
            uploads,
        }
    }

    pub async fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn KioskStore> = JsonDocumentStore::<Document>::new(&cfg.storage.data_file);
        let themes = ThemeRegistry::load(&cfg.storage.themes_file).await?;
        let uploads = UploadService::new(
            &cfg.storage.uploads_dir,
            cfg.uploads.max_bytes,
            cfg.uploads.allowed_extensions.clone(),
        );
        Ok(Self::new(store, themes, uploads))
    }
}
