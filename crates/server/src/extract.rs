//! Request extractors whose rejections use the JSON error body.

use axum::extract::{FromRequest, FromRequestParts};

use crate::errors::JsonApiError;

/// `axum::Json` with rejections reported as [`JsonApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(JsonApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` with rejections reported as [`JsonApiError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(JsonApiError))]
pub struct ApiPath<T>(pub T);
