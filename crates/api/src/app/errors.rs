use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

use myblog_auth::SessionError;
use myblog_core::ApiError;
use myblog_infra::StoreError;

/// Why a handler did not produce a reply.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Domain refusal; the caller gets `{error, data, message}` with status 200.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A session cookie could not be issued.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HandlerError::Api(e) => (StatusCode::OK, axum::Json(e.body())).into_response(),
            HandlerError::Store(e) => store_error_to_response(e),
            HandlerError::Session(e) => {
                tracing::error!(error = %e, "failed to issue session");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "session_error", e.to_string())
            }
        }
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    tracing::error!(error = %err, "store failure");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
