use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Failure responses of the submission endpoint
#[derive(Error, Debug)]
pub enum ApiError {
    /// Body was not a JSON object with a non-empty `ip` string
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Reputation lookup failed (non-200, timeout or transport error)
    #[error("failed to check IP")]
    LookupFailed,

    /// Verdict was computed but could not be published
    #[error("failed to publish scan result")]
    PublishFailed,

    /// The request pipeline task did not complete
    #[error("internal error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::LookupFailed | Self::PublishFailed | Self::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
