use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use advert_types::api::{ErrorMessage, ErrorResponse};

use crate::config::ConflictStatus;
use crate::validation::ValidationError;

/// Everything a workflow operation can fail with.
#[derive(Debug, Error)]
pub enum AdvertError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("advertisement not found")]
    NotFound,

    #[error("invalid user specified")]
    Unauthorized,

    #[error("advertisement already exists")]
    Conflict,

    #[error("store failure: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for AdvertError {
    fn from(err: rusqlite::Error) -> Self {
        if advert_db::is_unique_violation(&err) {
            AdvertError::Conflict
        } else {
            AdvertError::Store(err.into())
        }
    }
}

impl AdvertError {
    pub fn status_code(&self, conflict: ConflictStatus) -> StatusCode {
        match self {
            AdvertError::Validation(_) => StatusCode::BAD_REQUEST,
            AdvertError::NotFound => StatusCode::NOT_FOUND,
            AdvertError::Unauthorized => StatusCode::UNAUTHORIZED,
            AdvertError::Conflict => conflict.status_code(),
            AdvertError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Translate into the `{"status": "error", "message": ...}` envelope.
    /// Store failures are logged here and reach the client only as a
    /// generic message.
    pub fn into_reply(self, conflict: ConflictStatus) -> ErrorReply {
        let status = self.status_code(conflict);
        let message = match self {
            AdvertError::Validation(err) => ErrorMessage::Fields(err.errors),
            AdvertError::Store(err) => {
                error!("Store failure: {:#}", err);
                ErrorMessage::Text("internal server error".to_string())
            }
            other => ErrorMessage::Text(other.to_string()),
        };
        ErrorReply::new(status, message)
    }
}

/// A finished error response.
#[derive(Debug)]
pub struct ErrorReply {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ErrorReply {
    pub fn new(status: StatusCode, message: ErrorMessage) -> Self {
        Self {
            status,
            body: ErrorResponse::new(message),
        }
    }
}

impl IntoResponse for ErrorReply {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
