//! Maps domain errors to HTTP responses.
//!
//! Every error body is a JSON string, the same shape successful uploads use
//! for their messages.

use axum::{
    extract::multipart::MultipartRejection,
    extract::rejection::{BytesRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::ingest::IngestError;
use crate::query::QueryError;
use crate::store::StoreError;

pub const INVALID_DOWNLOAD_NAME: &str = "invalid name for file";
pub const INVALID_INFO_NAME: &str = "invalid 'name' argument";
const INTERNAL_ERROR: &str = "internal error";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(cause: impl std::fmt::Display) -> Self {
        error!("Internal error: {}", cause);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: INTERNAL_ERROR.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.message)).into_response()
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::InvalidFileType {
                file_name: None, ..
            } => Self {
                status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
                message: "invalid filetype".to_string(),
            },
            IngestError::InvalidFileType {
                file_name: Some(name),
                ..
            } => Self {
                status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
                message: format!("invalid file type for {}", name),
            },
            IngestError::NoFileSubmitted => Self::bad_request("no file submitted"),
            IngestError::InvalidFilename(name) => {
                Self::bad_request(format!("invalid file name {}", name))
            }
            IngestError::NameTaken(name) => Self {
                status: StatusCode::CONFLICT,
                message: format!("file {} already exists", name),
            },
            IngestError::Store(err) => Self::internal(err),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::internal(err)
    }
}

// Extractor rejections keep axum's status and text, as a JSON string body.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(err)
    }
}
