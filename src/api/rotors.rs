//! Rotor API endpoints.

use axum::extract::{Path, State};
use chrono::Utc;

use super::{respond, ApiJson, ApiResult};
use crate::models::{CreateRotorRequest, RenameRotorRequest, Rotor};
use crate::AppState;

/// GET /api/class-types/:class_type_id/rotors - List rotors, newest version first.
pub async fn list_rotors(
    State(state): State<AppState>,
    Path(class_type_id): Path<String>,
) -> ApiResult<Vec<Rotor>> {
    let result = state.engine.list_rotors_by_class_type(&class_type_id).await;
    respond(&state, result).await
}

/// POST /api/class-types/:class_type_id/rotors - Create a draft rotor.
pub async fn create_rotor(
    State(state): State<AppState>,
    Path(class_type_id): Path<String>,
    ApiJson(request): ApiJson<CreateRotorRequest>,
) -> ApiResult<Rotor> {
    let result = state
        .engine
        .create_rotor(&class_type_id, &request.name, &request.created_by)
        .await;
    respond(&state, result).await
}

/// GET /api/class-types/:class_type_id/active-rotor - The active rotor, or null.
pub async fn get_active_rotor(
    State(state): State<AppState>,
    Path(class_type_id): Path<String>,
) -> ApiResult<Option<Rotor>> {
    let result = state.engine.get_active_rotor(&class_type_id).await;
    respond(&state, result).await
}

/// GET /api/rotors/:id - Get a single rotor.
pub async fn get_rotor(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Rotor> {
    let result = state.engine.get_rotor(&id).await;
    respond(&state, result).await
}

/// PUT /api/rotors/:id - Rename a rotor.
pub async fn rename_rotor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<RenameRotorRequest>,
) -> ApiResult<Rotor> {
    let result = state.engine.rename_rotor(&id, &request.name).await;
    respond(&state, result).await
}

/// DELETE /api/rotors/:id - Delete a non-active rotor.
pub async fn delete_rotor(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let result = state.engine.delete_rotor(&id).await;
    respond(&state, result).await
}

/// POST /api/rotors/:id/activate - Activate, archiving the previous active rotor.
pub async fn activate_rotor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Rotor> {
    let result = state.engine.activate_rotor(&id, Utc::now()).await;
    respond(&state, result).await
}

/// POST /api/rotors/:id/archive - Archive the active rotor.
pub async fn archive_rotor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Rotor> {
    let result = state.engine.archive_rotor(&id).await;
    respond(&state, result).await
}

/// POST /api/rotors/:id/preview - Toggle coach preview.
pub async fn toggle_preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Rotor> {
    let result = state.engine.toggle_preview(&id).await;
    respond(&state, result).await
}
