use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::views;

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("Path is outside the shared directory")]
    Traversal,

    #[error("No such file or directory {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload failed: {0}")]
    Write(String),

    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("No file selected for upload")]
    MissingFile,

    #[error("Malformed upload: {message}")]
    Multipart { status: StatusCode, message: String },
}

impl ShareError {
    pub fn status(&self) -> StatusCode {
        match self {
            ShareError::Traversal => StatusCode::FORBIDDEN,
            ShareError::NotFound(_) => StatusCode::NOT_FOUND,
            ShareError::Io(_) | ShareError::Write(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ShareError::InvalidFileName(_) | ShareError::MissingFile => StatusCode::BAD_REQUEST,
            ShareError::Multipart { status, .. } => *status,
        }
    }

    /// Renders the error as the JSON body the upload form expects.
    pub fn into_json(self) -> Response {
        let body = UploadFailure {
            success: false,
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct UploadFailure {
    success: bool,
    error: String,
}

/// Browsing routes answer with an HTML error page.
impl IntoResponse for ShareError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, views::error_page(status, &self.to_string())).into_response()
    }
}

pub type Result<T, E = ShareError> = std::result::Result<T, E>;
