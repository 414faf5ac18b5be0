use crate::server::types::{ErrorDetail, ErrorMessage};
use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failures of the landmark endpoint.
///
/// Everything except `Internal` is the caller's fault and is answered with a `detail` message.
/// `Internal` covers decoder crashes, detector errors and anything else unexpected.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid image file")]
    InvalidImage,

    #[error("Field required: file")]
    MissingFile,

    #[error("Expected an uploaded file in field: file")]
    NotAFile,

    #[error("{message}")]
    Multipart { status: StatusCode, message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidImage => StatusCode::BAD_REQUEST,
            ApiError::MissingFile | ApiError::NotAFile => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Multipart { status, .. } => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::Multipart {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Internal(err) => {
                tracing::error!("landmark extraction failed: {:#}", err);
                (
                    status,
                    Json(ErrorMessage {
                        error: err.to_string(),
                    }),
                )
                    .into_response()
            }
            other => {
                tracing::debug!("rejected landmark request ({}): {}", status, other);
                (
                    status,
                    Json(ErrorDetail {
                        detail: other.to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}
