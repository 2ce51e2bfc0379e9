//! Persisted kiosk data model: the document, its slides, global display
//! settings and the theme registry entries.

pub mod errors;
pub mod document;
pub mod slide;
pub mod theme;

pub use document::{Document, GlobalSettings, SettingsPatch, Watermark, WatermarkPosition};
pub use slide::{Slide, SlideInput, SlidePatch, DEFAULT_ACCENT_COLOR, MIN_SLIDE_TIME_MS};
pub use theme::{Theme, ThemeCategory};
