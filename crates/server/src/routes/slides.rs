use axum::{extract::State, http::StatusCode, Json};
use models::{Slide, SlideInput, SlidePatch};
use serde::Deserialize;

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub order: Vec<u32>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Slide>>, JsonApiError> {
    Ok(Json(state.slides.list().await?))
}

/// Slides shown on the public display.
pub async fn list_visible(State(state): State<AppState>) -> Result<Json<Vec<Slide>>, JsonApiError> {
    Ok(Json(state.slides.list_visible().await?))
}

pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u32>,
) -> Result<Json<Slide>, JsonApiError> {
    Ok(Json(state.slides.get(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SlideInput>,
) -> Result<(StatusCode, Json<Slide>), JsonApiError> {
    let slide = state.slides.create(input).await?;
    Ok((StatusCode::CREATED, Json(slide)))
}

pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u32>,
    ApiJson(patch): ApiJson<SlidePatch>,
) -> Result<Json<Slide>, JsonApiError> {
    Ok(Json(state.slides.update(id, patch).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<u32>,
) -> Result<StatusCode, JsonApiError> {
    state.slides.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reorder(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ReorderRequest>,
) -> Result<Json<Vec<Slide>>, JsonApiError> {
    Ok(Json(state.slides.reorder(req.order).await?))
}
