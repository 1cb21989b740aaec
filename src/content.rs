use std::{fs::Metadata, path::Path};

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::fs::{self, File};
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use crate::error::{Result, ShareError};

/// An opened regular file, ready to stream.
#[derive(Debug)]
pub struct FileContent {
    pub file: File,
    pub len: u64,
    pub mime: String,
    pub file_name: String,
}

/// Opens `path` for serving; anything that is not a readable regular file is
/// reported as not found.
pub async fn open(path: &Path, logical: &str) -> Result<FileContent> {
    let not_found = || ShareError::NotFound(logical.to_string());

    let metadata = fs::metadata(path).await.map_err(|_| not_found())?;
    if !metadata.is_file() {
        return Err(not_found());
    }
    open_checked(path, logical, metadata).await
}

/// Second half of [`open`]: `metadata` was read earlier and the file may
/// have vanished since.
async fn open_checked(path: &Path, logical: &str, metadata: Metadata) -> Result<FileContent> {
    let file = File::open(path).await.map_err(|e| {
        warn!("File {} disappeared before it could be opened: {}", path.display(), e);
        ShareError::NotFound(logical.to_string())
    })?;

    Ok(FileContent {
        file,
        len: metadata.len(),
        mime: mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string(),
        file_name: path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("download")
            .to_string(),
    })
}

impl FileContent {
    /// Streams the file inline.
    pub fn into_inline(self) -> Response {
        self.into_response_with(None)
    }

    /// Streams the file with an attachment disposition.
    pub fn into_attachment(self) -> Response {
        let disposition = HeaderValue::from_str(&format!(
            "attachment; filename=\"{}\"",
            self.file_name.replace('"', "'")
        ))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"download\""));
        self.into_response_with(Some(disposition))
    }

    fn into_response_with(self, disposition: Option<HeaderValue>) -> Response {
        info!("Serving {} ({} bytes, {})", self.file_name, self.len, self.mime);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(&self.mime)
                .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
        );
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(self.len));
        if let Some(disposition) = disposition {
            headers.insert(header::CONTENT_DISPOSITION, disposition);
        }

        let body = Body::from_stream(ReaderStream::new(self.file));
        (StatusCode::OK, headers, body).into_response()
    }
}
