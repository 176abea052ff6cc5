//! Topic schedule API endpoints.

use axum::extract::{Path, State};
use chrono::Utc;

use super::{respond, ApiJson, ApiResult};
use crate::models::{
    BumpTopicRequest, ScheduleAction, ScheduleActionRequest, ScheduleOutcome, TopicSchedule,
};
use crate::AppState;

/// POST /api/themes/:id/schedule - Activate, complete, skip or extend.
pub async fn schedule_action(
    State(state): State<AppState>,
    Path(theme_id): Path<String>,
    ApiJson(request): ApiJson<ScheduleActionRequest>,
) -> ApiResult<ScheduleOutcome> {
    let result = match ScheduleAction::try_from(request) {
        Ok(action) => {
            state
                .engine
                .apply_schedule_action(&theme_id, action, Utc::now())
                .await
        }
        Err(e) => Err(e),
    };
    respond(&state, result).await
}

/// POST /api/themes/:id/bump - Start a topic now, out of queue order.
pub async fn bump_topic(
    State(state): State<AppState>,
    Path(theme_id): Path<String>,
    ApiJson(request): ApiJson<BumpTopicRequest>,
) -> ApiResult<ScheduleOutcome> {
    let result = state
        .engine
        .bump_topic(&theme_id, &request.topic_id, Utc::now())
        .await;
    respond(&state, result).await
}

/// GET /api/themes/:id/schedule - The running schedule, or null when idle.
pub async fn get_active_schedule(
    State(state): State<AppState>,
    Path(theme_id): Path<String>,
) -> ApiResult<Option<TopicSchedule>> {
    let result = match state.engine.get_theme(&theme_id).await {
        Ok(_) => state.engine.get_active_schedule(&theme_id).await,
        Err(e) => Err(e),
    };
    respond(&state, result).await
}

/// GET /api/themes/:id/schedules - Schedule history, newest first.
pub async fn list_schedules(
    State(state): State<AppState>,
    Path(theme_id): Path<String>,
) -> ApiResult<Vec<TopicSchedule>> {
    let result = state.engine.list_schedules(&theme_id).await;
    respond(&state, result).await
}
