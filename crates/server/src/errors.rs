use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use tracing::error;

/// JSON error body: `{"error": <title>, "detail": <message>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", Some(detail.into()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, detail = ?self.detail, "request failed");
        }
        let body = serde_json::json!({"error": self.title, "detail": self.detail});
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let detail = Some(e.to_string());
        match e {
            ServiceError::Validation(_) => Self::new(StatusCode::BAD_REQUEST, "Validation Error", detail),
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Not Found", detail),
            ServiceError::PayloadTooLarge(_) => Self::new(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large", detail),
            ServiceError::CorruptStore { .. } => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Corrupt Store", detail),
            ServiceError::Serialization(_) | ServiceError::Io(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", detail)
            }
        }
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(e: JsonRejection) -> Self {
        Self::new(e.status(), "Invalid Request Body", Some(e.body_text()))
    }
}

impl From<PathRejection> for JsonApiError {
    fn from(e: PathRejection) -> Self {
        Self::new(e.status(), "Invalid Path", Some(e.body_text()))
    }
}

impl From<MultipartRejection> for JsonApiError {
    fn from(e: MultipartRejection) -> Self {
        Self::new(e.status(), "Invalid Upload", Some(e.body_text()))
    }
}
