use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use models::{Document, Slide};

use crate::errors::ServiceError;
use crate::storage::json_document_store::JsonDocumentStore;

/// A whole-document change run inside the store's write slot. It may return the
/// slide it created, changed or removed so the caller does not need a second read.
pub type Mutation = Box<dyn FnOnce(&mut Document) -> Result<Option<Slide>, ServiceError> + Send>;

pub type InspectionFuture = Pin<Box<dyn Future<Output = Result<(), ServiceError>> + Send>>;

/// Async work on a document snapshot that must finish before the next write lands.
pub type Inspection = Box<dyn FnOnce(Document) -> InspectionFuture + Send>;

/// Trait abstraction for kiosk document storage.
/// Collaborators hold an `Arc<dyn KioskStore>` and never touch the file directly.
#[async_trait]
pub trait KioskStore: Send + Sync {
    /// Current document; seeded with defaults if none exists yet.
    async fn read(&self) -> Result<Document, ServiceError>;
    /// Replace the whole document.
    async fn write(&self, doc: Document) -> Result<(), ServiceError>;
    /// Read-modify-write as one queued unit. Returns the document as written.
    async fn update(&self, mutation: Mutation) -> Result<(Document, Option<Slide>), ServiceError>;
    /// Run `task` on the current document while holding the write slot. Nothing is written.
    async fn inspect(&self, task: Inspection) -> Result<(), ServiceError>;
}

#[async_trait]
impl KioskStore for JsonDocumentStore<Document> {
    async fn read(&self) -> Result<Document, ServiceError> {
        JsonDocumentStore::read(self).await
    }

    async fn write(&self, doc: Document) -> Result<(), ServiceError> {
        JsonDocumentStore::write(self, &doc).await
    }

    async fn update(&self, mutation: Mutation) -> Result<(Document, Option<Slide>), ServiceError> {
        JsonDocumentStore::update(self, mutation).await
    }

    async fn inspect(&self, task: Inspection) -> Result<(), ServiceError> {
        JsonDocumentStore::inspect(self, task).await
    }
}
