//! Curriculum read endpoints.

use axum::extract::{Path, Query, State};

use super::{respond, ApiResult};
use crate::models::{CurriculumView, OverviewEntry, ViewQuery};
use crate::AppState;

/// GET /api/curriculum?role= - Active rotor per class type.
pub async fn get_overview(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> ApiResult<Vec<OverviewEntry>> {
    let result = state.engine.get_overview(query.role).await;
    respond(&state, result).await
}

/// GET /api/curriculum/:class_type_id?role=&accountId= - Full curriculum view.
pub async fn get_view(
    State(state): State<AppState>,
    Path(class_type_id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> ApiResult<CurriculumView> {
    let result = state
        .engine
        .get_view(&class_type_id, query.role, query.account_id.as_deref())
        .await;
    respond(&state, result).await
}
