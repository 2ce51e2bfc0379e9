//! Service layer for the kiosk backend.
//! - `storage` owns the persisted document and the write queue.
//! - `slides` and `settings` are the read-modify-write collaborators the HTTP layer calls.
//! - `themes` and `uploads` back the theme picker and image uploads.

pub mod errors;
pub mod observability;
pub mod storage;
pub mod slides;
pub mod settings;
pub mod themes;
pub mod uploads;
#[cfg(test)]
pub mod test_support;
