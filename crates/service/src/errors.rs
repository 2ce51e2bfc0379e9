use thiserror::Error;

use models::errors::ModelError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// The document could not be turned into JSON; nothing was written.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// The document file exists but is not a valid document. It is left untouched.
    #[error("corrupt store {path}: {reason}")]
    CorruptStore { path: String, reason: String },
    #[error("io error: {0}")]
    Io(String),
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => Self::Validation(msg),
        }
    }
}
