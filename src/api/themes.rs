//! Rotor theme API endpoints.

use axum::extract::{Path, State};

use super::{respond, ApiJson, ApiResult};
use crate::models::{CreateThemeRequest, RotorTheme, UpdateThemeRequest};
use crate::AppState;

/// GET /api/rotors/:id/themes - List themes in display order.
pub async fn list_themes(
    State(state): State<AppState>,
    Path(rotor_id): Path<String>,
) -> ApiResult<Vec<RotorTheme>> {
    let result = state.engine.list_themes_by_rotor(&rotor_id).await;
    respond(&state, result).await
}

/// POST /api/rotors/:id/themes - Add a theme to a draft rotor.
pub async fn create_theme(
    State(state): State<AppState>,
    Path(rotor_id): Path<String>,
    ApiJson(request): ApiJson<CreateThemeRequest>,
) -> ApiResult<RotorTheme> {
    let result = state.engine.add_theme(&rotor_id, request).await;
    respond(&state, result).await
}

/// GET /api/themes/:id - Get a single theme.
pub async fn get_theme(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<RotorTheme> {
    let result = state.engine.get_theme(&id).await;
    respond(&state, result).await
}

/// PUT /api/themes/:id - Rename, move or hide a theme.
pub async fn update_theme(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateThemeRequest>,
) -> ApiResult<RotorTheme> {
    let result = state.engine.update_theme(&id, request).await;
    respond(&state, result).await
}

/// DELETE /api/themes/:id - Delete a theme and everything under it.
pub async fn delete_theme(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let result = state.engine.delete_theme(&id).await;
    respond(&state, result).await
}
