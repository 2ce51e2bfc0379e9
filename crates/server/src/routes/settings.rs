use axum::{extract::State, Json};
use models::{GlobalSettings, SettingsPatch, Theme};

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

pub async fn get(State(state): State<AppState>) -> Result<Json<GlobalSettings>, JsonApiError> {
    Ok(Json(state.settings.get().await?))
}

pub async fn update(
    State(state): State<AppState>,
    ApiJson(patch): ApiJson<SettingsPatch>,
) -> Result<Json<GlobalSettings>, JsonApiError> {
    Ok(Json(state.settings.update(patch).await?))
}

/// Registered themes, in declaration order.
pub async fn themes(State(state): State<AppState>) -> Json<Vec<Theme>> {
    Json(state.themes.list().to_vec())
}
