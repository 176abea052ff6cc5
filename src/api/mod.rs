//! REST API module.
//!
//! Thin transport adapter: each handler decodes the request, calls the
//! engine and wraps the result in the response envelope.

mod curriculum;
mod rotors;
mod schedule;
mod themes;
mod topics;
mod votes;

pub use curriculum::*;
pub use rotors::*;
pub use schedule::*;
pub use themes::*;
pub use topics::*;
pub use votes::*;

use axum::{
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::{AppError, AppErrorWithRevision};
use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision_id: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, revision_id: i64) -> Self {
        Self {
            success: true,
            data,
            revision_id,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppErrorWithRevision>;

/// JSON body extractor whose rejections use the error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppErrorWithRevision))]
pub struct ApiJson<T>(pub T);

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, revision_id: i64) -> ApiResult<T> {
    Ok(ApiResponse::new(data, revision_id))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: AppError, revision_id: i64) -> ApiResult<T> {
    Err(AppErrorWithRevision {
        error: err,
        revision_id,
    })
}

/// Wrap an engine result, stamping the revision current after the call.
pub async fn respond<T: Serialize>(state: &AppState, result: Result<T, AppError>) -> ApiResult<T> {
    let revision_id = state.engine.repo().get_revision_id().await.unwrap_or(0);

    match result {
        Ok(data) => success(data, revision_id),
        Err(e) => {
            if e.status_code().is_server_error() {
                tracing::error!("Request failed: {}", e);
            } else if e.is_conflict() {
                tracing::debug!("Request conflicted: {}", e);
            }
            error(e, revision_id)
        }
    }
}
