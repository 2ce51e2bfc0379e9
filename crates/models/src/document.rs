use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;
use crate::slide::Slide;

pub const DEFAULT_THEME: &str = "default";
pub const DEFAULT_TITLE_FONT_SIZE: f64 = 48.0;
pub const DEFAULT_DESCRIPTION_FONT_SIZE: f64 = 24.0;

/// The single persisted unit: global display settings plus the ordered slide list.
///
/// `Default` is the document seeded on first run.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub global_settings: GlobalSettings,
    #[serde(default)]
    pub slides: Vec<Slide>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_title_font_size")]
    pub title_font_size: f64,
    #[serde(default = "default_description_font_size")]
    pub description_font_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark: Option<Watermark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<BTreeMap<String, bool>>,
    /// Keys written by the admin UI that this crate does not model; kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_theme() -> String { DEFAULT_THEME.to_string() }
fn default_title_font_size() -> f64 { DEFAULT_TITLE_FONT_SIZE }
fn default_description_font_size() -> f64 { DEFAULT_DESCRIPTION_FONT_SIZE }

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            title_font_size: DEFAULT_TITLE_FONT_SIZE,
            description_font_size: DEFAULT_DESCRIPTION_FONT_SIZE,
            watermark: Some(Watermark::default()),
            performance: None,
            extra: Map::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Watermark {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub position: WatermarkPosition,
    #[serde(default = "default_watermark_size")]
    pub size: f64,
    #[serde(default = "default_watermark_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub image: String,
}

fn default_watermark_size() -> f64 { 100.0 }
fn default_watermark_opacity() -> f64 { 0.5 }

impl Default for Watermark {
    fn default() -> Self {
        Self {
            enabled: false,
            position: WatermarkPosition::default(),
            size: default_watermark_size(),
            opacity: default_watermark_opacity(),
            image: String::new(),
        }
    }
}

impl Watermark {
    pub fn validate(&self) -> Result<(), ModelError> {
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(ModelError::invalid("watermark size must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ModelError::invalid("watermark opacity must be within 0..=1"));
        }
        if self.enabled && self.image.trim().is_empty() {
            return Err(ModelError::invalid("enabled watermark needs an image"));
        }
        Ok(())
    }
}

impl GlobalSettings {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.theme.trim().is_empty() {
            return Err(ModelError::invalid("theme must not be empty"));
        }
        for (name, size) in [
            ("titleFontSize", self.title_font_size),
            ("descriptionFontSize", self.description_font_size),
        ] {
            if !(size.is_finite() && size > 0.0) {
                return Err(ModelError::invalid(format!("{name} must be a positive number")));
            }
        }
        if let Some(w) = &self.watermark {
            w.validate()?;
        }
        Ok(())
    }
}

/// Partial settings update. The watermark is replaced as a whole; performance
/// flags are merged key by key.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub theme: Option<String>,
    pub title_font_size: Option<f64>,
    pub description_font_size: Option<f64>,
    pub watermark: Option<Watermark>,
    pub performance: Option<BTreeMap<String, bool>>,
}

impl SettingsPatch {
    /// Merge onto a copy of `current` and validate the result.
    pub fn merged(&self, current: &GlobalSettings) -> Result<GlobalSettings, ModelError> {
        let mut next = current.clone();
        if let Some(theme) = &self.theme { next.theme = theme.trim().to_string(); }
        if let Some(size) = self.title_font_size { next.title_font_size = size; }
        if let Some(size) = self.description_font_size { next.description_font_size = size; }
        if let Some(w) = &self.watermark { next.watermark = Some(w.clone()); }
        if let Some(flags) = &self.performance {
            next.performance
                .get_or_insert_with(BTreeMap::new)
                .extend(flags.iter().map(|(k, v)| (k.clone(), *v)));
        }
        next.validate()?;
        Ok(next)
    }
}
