//! Topic API endpoints.

use axum::extract::{Path, State};

use super::{respond, ApiJson, ApiResult};
use crate::models::{CreateTopicRequest, ReorderTopicsRequest, Topic, UpdateTopicRequest};
use crate::AppState;

/// GET /api/themes/:id/topics - List topics in queue order.
pub async fn list_topics(
    State(state): State<AppState>,
    Path(theme_id): Path<String>,
) -> ApiResult<Vec<Topic>> {
    let result = state.engine.list_topics_by_theme(&theme_id).await;
    respond(&state, result).await
}

/// POST /api/themes/:id/topics - Add a topic.
pub async fn create_topic(
    State(state): State<AppState>,
    Path(theme_id): Path<String>,
    ApiJson(request): ApiJson<CreateTopicRequest>,
) -> ApiResult<Topic> {
    let result = state.engine.add_topic(&theme_id, request).await;
    respond(&state, result).await
}

/// PUT /api/themes/:id/topics/order - Reorder topics.
pub async fn reorder_topics(
    State(state): State<AppState>,
    Path(theme_id): Path<String>,
    ApiJson(request): ApiJson<ReorderTopicsRequest>,
) -> ApiResult<Vec<Topic>> {
    let result = state
        .engine
        .reorder_topics(&theme_id, &request.topic_ids)
        .await;
    respond(&state, result).await
}

/// GET /api/topics/:id - Get a single topic.
pub async fn get_topic(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Topic> {
    let result = state.engine.get_topic(&id).await;
    respond(&state, result).await
}

/// PUT /api/topics/:id - Partially update a topic.
pub async fn update_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateTopicRequest>,
) -> ApiResult<Topic> {
    let result = state.engine.update_topic(&id, request).await;
    respond(&state, result).await
}

/// DELETE /api/topics/:id - Delete a topic.
pub async fn delete_topic(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let result = state.engine.delete_topic(&id).await;
    respond(&state, result).await
}
