//! File handlers.

use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    http::header,
    response::Response,
    Extension, Json,
};
use futures::TryStreamExt;
use tokio_util::io::ReaderStream;

use super::AppState;
use crate::auth::Session;
use crate::storage::{object_key, spool_to_tempfile, ObjectDownload, MAX_UPLOAD_SIZE};
use crate::web::dto::{DeleteResponse, FileEntry, FilenameQuery, UploadResponse};
use crate::web::error::ApiError;

/// Multipart field carrying the upload.
pub const UPLOAD_FIELD: &str = "file";

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Control characters are dropped. The quoted `filename` is an ASCII
/// fallback; names that need it also get an RFC 5987 `filename*`.
fn content_disposition_header(filename: &str) -> String {
    let cleaned: String = filename.chars().filter(|c| !c.is_control()).collect();

    let fallback: String = cleaned
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            c => c,
        })
        .collect();

    if fallback == cleaned {
        return format!("attachment; filename=\"{}\"", cleaned);
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(&cleaned)
    )
}

fn require_filename(query: &FilenameQuery) -> Result<&str, ApiError> {
    query
        .filename()
        .ok_or_else(|| ApiError::bad_request("Filename is required"))
}

/// POST /api/upload - Store the multipart field `file`.
///
/// The field is spooled to a temporary file first so the exact size is
/// known before anything is sent to object storage.
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Rejected upload: {}", e);
        ApiError::bad_request("Invalid multipart request")
    })?;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        object_key(&filename)?;
        let content_type = field.content_type().map(str::to_string);

        let spooled = spool_to_tempfile(field, MAX_UPLOAD_SIZE).await?;
        let body = spooled.body().await?;
        let outcome = state
            .files
            .upload(body, &filename, spooled.size(), content_type.as_deref())
            .await?;

        tracing::info!(
            username = %session.username,
            key = %outcome.key,
            size = outcome.size,
            "Upload complete"
        );
        return Ok(Json(outcome.into()));
    }

    Err(ApiError::bad_request("Missing file field"))
}

/// GET /api/files - List stored files.
pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<FileEntry>>, ApiError> {
    let files = state.files.list().await?;
    Ok(Json(files.into_iter().map(FileEntry::from).collect()))
}

/// GET /api/download?filename= - Stream a stored file.
pub async fn download_file(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<FilenameQuery>,
) -> Result<Response, ApiError> {
    let key = require_filename(&query)?;

    let ObjectDownload {
        content_type,
        size,
        body,
    } = state.files.download(key).await?;

    tracing::info!(username = %session.username, key, size, "Download started");

    let log_key = key.to_string();
    let stream = ReaderStream::new(body.into_async_read()).inspect_err(move |e| {
        tracing::error!(key = %log_key, "Download interrupted: {}", e);
    });

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size)
        .header(header::CONTENT_DISPOSITION, content_disposition_header(key))
        .body(Body::from_stream(stream))
        .map_err(|e| {
            tracing::error!("Failed to build download response: {}", e);
            ApiError::internal("Failed to download file")
        })
}

/// DELETE /api/delete?filename= - Remove a stored file.
pub async fn delete_file(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<FilenameQuery>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let key = require_filename(&query)?;
    state.files.delete(key).await?;

    tracing::info!(username = %session.username, key, "File removed");
    Ok(Json(DeleteResponse::deleted(key)))
}
