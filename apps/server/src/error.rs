use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quotebook_core::errors::Error as CoreError;
use quotebook_core::quotes::QuoteError;
use quotebook_core::sync::SyncError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => match e {
                CoreError::Validation(_) | CoreError::Import(_) => StatusCode::BAD_REQUEST,
                CoreError::Quote(QuoteError::NotFound(_)) => StatusCode::NOT_FOUND,
                CoreError::Quote(QuoteError::NothingToExport) => StatusCode::NOT_FOUND,
                CoreError::Sync(SyncError::AlreadyInProgress) => StatusCode::CONFLICT,
                CoreError::Sync(SyncError::FetchFailed(_)) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
