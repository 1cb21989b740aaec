use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path as AxumPath, Query, State,
    },
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use maud::Markup;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    content,
    error::{Result, ShareError},
    listing, netinfo, qr, resolve, upload, views, SharedState,
};

// --- Request Payloads ---
#[derive(Deserialize, Debug)]
pub struct DownloadQuery {
    path: Option<String>,
}

// --- Response Data ---
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploadSuccess {
    success: bool,
    message: String,
    file_name: String,
    current_path: String,
}

/// `GET /`
pub async fn root_handler(State(state): State<SharedState>) -> Result<Response> {
    browse(&state, "/").await
}

/// `GET /<path>`: a listing for directories, the bytes for files.
pub async fn browse_handler(
    State(state): State<SharedState>,
    AxumPath(path): AxumPath<String>,
) -> Result<Response> {
    browse(&state, &format!("/{}", path)).await
}

async fn browse(state: &SharedState, logical: &str) -> Result<Response> {
    let full_path = resolve::resolve(&state.root_dir, logical)?;
    let metadata = tokio::fs::metadata(&full_path)
        .await
        .map_err(|_| ShareError::NotFound(logical.to_string()))?;

    if metadata.is_dir() {
        let current = resolve::logical_of(&state.root_dir, &full_path);
        let entries = listing::list(&full_path, &current).await?;
        info!("Listed {} ({} entries)", current, entries.len());
        Ok(views::directory_page(&current, &entries).into_response())
    } else {
        Ok(content::open(&full_path, logical).await?.into_inline())
    }
}

/// `GET /files/<path>`
pub async fn files_handler(
    State(state): State<SharedState>,
    AxumPath(path): AxumPath<String>,
) -> Result<Response> {
    let logical = format!("/{}", path);
    let full_path = resolve::resolve(&state.root_dir, &logical)?;
    Ok(content::open(&full_path, &logical).await?.into_inline())
}

/// `GET /download/<filename>?path=<dir>`
pub async fn download_handler(
    State(state): State<SharedState>,
    AxumPath(filename): AxumPath<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response> {
    let dir = query.path.unwrap_or_else(|| "/".to_string());
    let logical = format!("{}/{}", dir.trim_end_matches('/'), filename);
    info!("Download requested for {}", logical);

    let full_path = resolve::resolve(&state.root_dir, &logical)?;
    Ok(content::open(&full_path, &logical).await?.into_attachment())
}

/// `POST /upload`: multipart with `file` and `currentPath` fields.
pub async fn upload_handler(
    State(state): State<SharedState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let outcome = match multipart {
        Ok(multipart) => store_upload(&state, multipart).await,
        // Not a multipart body at all; the form still expects JSON back.
        Err(rejection) => Err(ShareError::Multipart {
            status: rejection.status(),
            message: rejection.body_text(),
        }),
    };
    match outcome {
        Ok(accepted) => Json(UploadSuccess {
            success: true,
            message: format!("File \"{}\" uploaded successfully", accepted.file_name),
            file_name: accepted.file_name,
            current_path: accepted.directory,
        })
        .into_response(),
        Err(e) => {
            warn!("Upload rejected: {}", e);
            e.into_json()
        }
    }
}

async fn store_upload(state: &SharedState, mut multipart: Multipart) -> Result<upload::Accepted> {
    let mut current_path = None;
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some("currentPath") => {
                current_path = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((name, data));
            }
            other => warn!("Ignoring unexpected upload field {:?}", other),
        }
    }

    let (file_name, data) = file.ok_or(ShareError::MissingFile)?;
    let target = current_path
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| "/".to_string());

    upload::upload(&state.root_dir, &target, &file_name, data).await
}

fn multipart_error(e: MultipartError) -> ShareError {
    ShareError::Multipart {
        status: e.status(),
        message: e.body_text(),
    }
}

/// `GET /qrcode`
pub async fn qrcode_handler(State(state): State<SharedState>) -> Markup {
    let ip = netinfo::local_ipv4();
    let url = format!("http://{}:{}", ip, state.port);
    let svg = qr::svg(&url)
        .map_err(|e| warn!("Failed to encode QR code for {}: {}", url, e))
        .ok();
    views::qrcode_page(&url, &ip, state.port, svg.as_deref())
}

/// `GET /active-users`
pub async fn active_users_handler(State(state): State<SharedState>) -> Markup {
    views::active_users_page(&state.clients.snapshot())
}
