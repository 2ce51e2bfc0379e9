//! Persistence for the kiosk document.
//!
//! `json_document_store` is the generic crash-safe JSON file store with the
//! in-process write queue; `kiosk_store` is the trait seam the services use.

pub mod json_document_store;
pub mod kiosk_store;

pub use json_document_store::JsonDocumentStore;
pub use kiosk_store::{Inspection, InspectionFuture, KioskStore, Mutation};
