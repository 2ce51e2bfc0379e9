use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use common::types::UploadResponse;

use crate::errors::JsonApiError;
use crate::state::AppState;

/// Form field carrying the image.
const IMAGE_FIELD: &str = "image";

/// Accept a multipart form with an `image` file field and store it.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), JsonApiError> {
    let mut multipart = multipart?;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        let path = state.uploads.save(&file_name, &bytes).await?;
        return Ok((StatusCode::CREATED, Json(UploadResponse { path })));
    }
    Err(JsonApiError::bad_request(format!("missing `{IMAGE_FIELD}` file field")))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> JsonApiError {
    let status = e.status();
    let title = if status == StatusCode::PAYLOAD_TOO_LARGE { "Payload Too Large" } else { "Bad Request" };
    JsonApiError::new(status, title, Some(e.body_text()))
}
