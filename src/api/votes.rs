//! Vote API endpoints.

use axum::extract::{Path, Query, State};
use chrono::Utc;

use super::{respond, ApiJson, ApiResult};
use crate::errors::AppError;
use crate::models::{CastVoteRequest, VoteCount, VoteQuery};
use crate::AppState;

/// GET /api/topics/:id/votes?accountId= - Current vote count.
pub async fn count_votes(
    State(state): State<AppState>,
    Path(topic_id): Path<String>,
    Query(query): Query<VoteQuery>,
) -> ApiResult<VoteCount> {
    let result = vote_count(&state, &topic_id, query.account_id.as_deref()).await;
    respond(&state, result).await
}

async fn vote_count(
    state: &AppState,
    topic_id: &str,
    account_id: Option<&str>,
) -> Result<VoteCount, AppError> {
    let votes = state.engine.count_votes(topic_id).await?;
    let has_voted = match account_id {
        Some(account_id) => Some(state.engine.has_voted(topic_id, account_id).await?),
        None => None,
    };
    Ok(VoteCount {
        topic_id: topic_id.to_string(),
        votes,
        has_voted,
    })
}

/// POST /api/topics/:id/votes - Cast a vote; 409 ALREADY_VOTED on repeat.
pub async fn cast_vote(
    State(state): State<AppState>,
    Path(topic_id): Path<String>,
    ApiJson(request): ApiJson<CastVoteRequest>,
) -> ApiResult<VoteCount> {
    let result = state
        .engine
        .cast_vote(&topic_id, &request.account_id, Utc::now())
        .await
        .map(|votes| VoteCount {
            topic_id: topic_id.clone(),
            votes,
            has_voted: Some(true),
        });
    respond(&state, result).await
}

/// DELETE /api/topics/:id/votes - Reset the voting round; returns the number removed.
pub async fn clear_votes(
    State(state): State<AppState>,
    Path(topic_id): Path<String>,
) -> ApiResult<u64> {
    let result = match state.engine.get_topic(&topic_id).await {
        Ok(_) => state.engine.clear_votes(&topic_id).await,
        Err(e) => Err(e),
    };
    respond(&state, result).await
}
