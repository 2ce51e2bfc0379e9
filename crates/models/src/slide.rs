use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ModelError;

/// Shortest display duration a slide may request, in milliseconds.
pub const MIN_SLIDE_TIME_MS: u64 = 4000;

/// Accent color assigned when a new slide does not provide one.
pub const DEFAULT_ACCENT_COLOR: &str = "#3b82f6";

/// One timed display entry.
///
/// `id` is the 1-based display position: it is dense and sequential across
/// the document and is re-established after every delete or reorder.
/// `time` is `None` when the slide uses the display's default duration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: u32,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
    #[serde(default)]
    pub time: Option<u64>,
    #[serde(default = "default_visibility")]
    pub visibility: bool,
}

fn default_accent_color() -> String { DEFAULT_ACCENT_COLOR.to_string() }
fn default_visibility() -> bool { true }

/// Create input: the id is assigned by the service from the slide's position.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlideInput {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub accent_color: Option<String>,
    #[serde(default)]
    pub time: Option<u64>,
    #[serde(default)]
    pub visibility: Option<bool>,
}

/// Partial update. Absent fields are left untouched; `"time": null` resets the
/// slide to the default duration, which is why `time` is a double option.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlidePatch {
    pub text: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub accent_color: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub time: Option<Option<u64>>,
    pub visibility: Option<bool>,
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<u64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<u64>::deserialize(deserializer).map(Some)
}

impl Slide {
    /// Content and timing rules every persisted slide must satisfy.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.text.trim().is_empty() && self.image.trim().is_empty() {
            return Err(ModelError::invalid("slide needs text or an image"));
        }
        validate_time(self.time)?;
        validate_accent_color(&self.accent_color)
    }
}

impl SlideInput {
    /// Build and validate the slide that will be stored under `id`.
    pub fn into_slide(self, id: u32) -> Result<Slide, ModelError> {
        let slide = Slide {
            id,
            text: self.text,
            description: self.description,
            image: self.image,
            accent_color: self.accent_color.unwrap_or_else(default_accent_color),
            time: self.time,
            visibility: self.visibility.unwrap_or(true),
        };
        slide.validate()?;
        Ok(slide)
    }
}

impl SlidePatch {
    /// Merge onto a copy of `current` and validate the result; `current` is never modified.
    pub fn merged(&self, current: &Slide) -> Result<Slide, ModelError> {
        let mut next = current.clone();
        if let Some(text) = &self.text { next.text = text.clone(); }
        if let Some(description) = &self.description { next.description = description.clone(); }
        if let Some(image) = &self.image { next.image = image.clone(); }
        if let Some(color) = &self.accent_color { next.accent_color = color.clone(); }
        if let Some(time) = self.time { next.time = time; }
        if let Some(visible) = self.visibility { next.visibility = visible; }
        next.validate()?;
        Ok(next)
    }
}

pub fn validate_time(time: Option<u64>) -> Result<(), ModelError> {
    match time {
        Some(ms) if ms < MIN_SLIDE_TIME_MS => Err(ModelError::invalid(format!(
            "slide time must be at least {MIN_SLIDE_TIME_MS} ms (got {ms})"
        ))),
        _ => Ok(()),
    }
}

/// Accepts `#RRGGBB` only.
pub fn validate_accent_color(color: &str) -> Result<(), ModelError> {
    let ok = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if ok {
        Ok(())
    } else {
        Err(ModelError::invalid(format!("accentColor must look like #RRGGBB (got {color:?})")))
    }
}

/// Reassign ids 1..=N following the current order.
pub fn renumber(slides: &mut [Slide]) {
    for (idx, slide) in slides.iter_mut().enumerate() {
        slide.id = idx as u32 + 1;
    }
}

/// Rearrange `slides` so they follow `order` (a list of current ids), then renumber.
///
/// `order` must name every current slide exactly once; otherwise `slides` is left as is.
pub fn reorder(slides: &mut Vec<Slide>, order: &[u32]) -> Result<(), ModelError> {
    if order.len() != slides.len() {
        return Err(ModelError::invalid(format!(
            "order lists {} ids but there are {} slides",
            order.len(),
            slides.len()
        )));
    }
    let mut positions = Vec::with_capacity(order.len());
    for id in order {
        let pos = slides
            .iter()
            .position(|s| s.id == *id)
            .ok_or_else(|| ModelError::invalid(format!("unknown slide id {id} in order")))?;
        if positions.contains(&pos) {
            return Err(ModelError::invalid(format!("slide id {id} repeated in order")));
        }
        positions.push(pos);
    }
    let mut taken: Vec<Option<Slide>> = slides.drain(..).map(Some).collect();
    slides.extend(positions.into_iter().filter_map(|pos| taken[pos].take()));
    renumber(slides);
    Ok(())
}
