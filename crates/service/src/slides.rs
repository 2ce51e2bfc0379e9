use std::sync::Arc;

use models::{slide, Document, Slide, SlideInput, SlidePatch};
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::storage::{InspectionFuture, KioskStore};
use crate::uploads::UploadService;

/// Slide list operations. Every change is a single queued read-modify-write
/// on the store, and ids are kept dense (1..=N, display order) after each one.
#[derive(Clone)]
pub struct SlideService {
    store: Arc<dyn KioskStore>,
    uploads: Option<Arc<UploadService>>,
}

impl SlideService {
    pub fn new(store: Arc<dyn KioskStore>) -> Self {
        Self { store, uploads: None }
    }

    /// Also delete uploaded images that a removed slide leaves unreferenced.
    pub fn with_uploads(mut self, uploads: Arc<UploadService>) -> Self {
        self.uploads = Some(uploads);
        self
    }

    pub async fn list(&self) -> Result<Vec<Slide>, ServiceError> {
        Ok(self.store.read().await?.slides)
    }

    /// Slides the public display page cycles through.
    pub async fn list_visible(&self) -> Result<Vec<Slide>, ServiceError> {
        let slides = self.store.read().await?.slides;
        Ok(slides.into_iter().filter(|s| s.visibility).collect())
    }

    pub async fn get(&self, id: u32) -> Result<Slide, ServiceError> {
        self.store
            .read()
            .await?
            .slides
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| ServiceError::not_found("slide"))
    }

    /// Append a slide; its id is the next position.
    pub async fn create(&self, input: SlideInput) -> Result<Slide, ServiceError> {
        // validated before the store is involved
        let draft = input.into_slide(0)?;
        let (_, created) = self
            .store
            .update(Box::new(move |doc: &mut Document| -> Result<Option<Slide>, ServiceError> {
                let mut slide = draft;
                slide.id = doc.slides.len() as u32 + 1;
                doc.slides.push(slide.clone());
                Ok(Some(slide))
            }))
            .await?;
        let created = touched(created)?;
        info!(slide_id = created.id, event = "slide_created", "slide created");
        Ok(created)
    }

    /// Merge `patch` onto slide `id`. Invalid results (e.g. `time` under the
    /// minimum) are rejected and the document is not written.
    pub async fn update(&self, id: u32, patch: SlidePatch) -> Result<Slide, ServiceError> {
        let (_, updated) = self
            .store
            .update(Box::new(move |doc: &mut Document| -> Result<Option<Slide>, ServiceError> {
                let current = doc
                    .slides
                    .iter_mut()
                    .find(|s| s.id == id)
                    .ok_or_else(|| ServiceError::not_found("slide"))?;
                *current = patch.merged(current)?;
                Ok(Some(current.clone()))
            }))
            .await?;
        touched(updated)
    }

    pub async fn set_visibility(&self, id: u32, visible: bool) -> Result<Slide, ServiceError> {
        self.update(id, SlidePatch { visibility: Some(visible), ..Default::default() }).await
    }

    /// Remove slide `id` and renumber the rest, keeping their relative order.
    pub async fn delete(&self, id: u32) -> Result<(), ServiceError> {
        let (doc, removed) = self
            .store
            .update(Box::new(move |doc: &mut Document| -> Result<Option<Slide>, ServiceError> {
                let pos = doc
                    .slides
                    .iter()
                    .position(|s| s.id == id)
                    .ok_or_else(|| ServiceError::not_found("slide"))?;
                let removed = doc.slides.remove(pos);
                slide::renumber(&mut doc.slides);
                Ok(Some(removed))
            }))
            .await?;
        let removed = touched(removed)?;
        info!(slide_id = id, remaining = doc.slides.len(), event = "slide_deleted", "slide deleted");
        self.release_image(removed.image).await;
        Ok(())
    }

    /// Put slides in the order given by `order` (current ids) and renumber.
    pub async fn reorder(&self, order: Vec<u32>) -> Result<Vec<Slide>, ServiceError> {
        let (doc, _) = self
            .store
            .update(Box::new(move |doc: &mut Document| -> Result<Option<Slide>, ServiceError> {
                slide::reorder(&mut doc.slides, &order)?;
                Ok(None)
            }))
            .await?;
        info!(count = doc.slides.len(), event = "slides_reordered", "slides reordered");
        Ok(doc.slides)
    }

    // best effort; the reference check and the unlink share one write slot
    async fn release_image(&self, image: String) {
        let Some(uploads) = self.uploads.clone() else { return };
        if !UploadService::is_managed(&image) {
            return;
        }
        let url = image.clone();
        let released = self
            .store
            .inspect(Box::new(move |doc: Document| -> InspectionFuture {
                Box::pin(async move {
                    if still_referenced(&doc, &url) {
                        return Ok(());
                    }
                    uploads.remove(&url).await.map(|_| ())
                })
            }))
            .await;
        if let Err(e) = released {
            warn!(image = %image, error = %e, "failed to remove unreferenced upload");
        }
    }
}

fn still_referenced(doc: &Document, image: &str) -> bool {
    doc.slides.iter().any(|s| s.image == image)
        || doc.global_settings.watermark.as_ref().is_some_and(|w| w.image == image)
}

fn touched(slide: Option<Slide>) -> Result<Slide, ServiceError> {
    slide.ok_or_else(|| ServiceError::Io("store update returned no slide".into()))
}
