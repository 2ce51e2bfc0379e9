use std::sync::Arc;

use models::{Document, GlobalSettings, SettingsPatch, Slide};
use tracing::info;

use crate::errors::ServiceError;
use crate::storage::KioskStore;
use crate::themes::ThemeRegistry;

/// Global display settings (theme, font sizes, watermark, performance flags).
#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn KioskStore>,
    themes: Arc<ThemeRegistry>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn KioskStore>, themes: Arc<ThemeRegistry>) -> Self {
        Self { store, themes }
    }

    pub async fn get(&self) -> Result<GlobalSettings, ServiceError> {
        Ok(self.store.read().await?.global_settings)
    }

    /// Merge `patch` into the stored settings. The theme must be registered.
    pub async fn update(&self, patch: SettingsPatch) -> Result<GlobalSettings, ServiceError> {
        if let Some(theme) = &patch.theme {
            if !self.themes.contains(theme.trim()) {
                return Err(ServiceError::Validation(format!("unknown theme {theme:?}")));
            }
        }
        let (doc, _) = self
            .store
            .update(Box::new(move |doc: &mut Document| -> Result<Option<Slide>, ServiceError> {
                doc.global_settings = patch.merged(&doc.global_settings)?;
                Ok(None)
            }))
            .await?;
        info!(theme = %doc.global_settings.theme, event = "settings_updated", "global settings updated");
        Ok(doc.global_settings)
    }
}
