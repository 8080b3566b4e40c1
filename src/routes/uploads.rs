use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;

use crate::{
    AppState,
    error::AppError,
    services::{
        file_processor::{self, UploadAnalysis},
        upload_workflow::{ProcessSummary, UploadKind, UploadState},
    },
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/templates/:kind", get(download_template))
        .route("/uploads/:kind", post(upload_file).get(upload_state).delete(reset_upload))
        .route("/uploads/:kind/from-url", post(upload_from_url))
        .route("/process", post(process_uploads))
}

#[derive(Debug, Deserialize)]
pub struct RemoteFile {
    file_name: String,
    signed_url: String,
}

async fn download_template(Path(kind): Path<UploadKind>) -> impl IntoResponse {
    let (file_name, body) = kind.template();
    tracing::info!("Serving template {}", file_name);
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
}

/// Runs one upload through the workflow. A type rejection happens before the
/// slot is touched, so the previous table survives it. Dropping the future
/// mid-read fails the slot instead of leaving it in `Reading`.
async fn ingest<F>(
    state: &AppState,
    kind: UploadKind,
    file_name: &str,
    content_type: Option<&str>,
    read: F,
) -> Result<UploadAnalysis, AppError>
where
    F: Future<Output = Result<Bytes, AppError>>,
{
    file_processor::validate_file_type(file_name, content_type)?;

    let guard = state.uploads.start(kind);
    tracing::info!(
        "Upload {} started for {}: {}",
        guard.ticket().upload_id,
        kind.label(),
        file_name
    );

    let result = read.await.and_then(|data| {
        file_processor::process_upload(
            file_name,
            content_type,
            &data,
            state.config.max_file_size,
            state.config.preview_rows,
        )
    });

    if !guard.finish(&result) {
        return Err(AppError::Conflict(format!(
            "Upload of {} was superseded by a newer {} file",
            file_name,
            kind.label()
        )));
    }
    result
}

async fn upload_file(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<UploadKind>,
    mut multipart: Multipart,
) -> Result<Json<UploadAnalysis>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let read = async move {
            field
                .bytes()
                .await
                .map_err(|e| AppError::MalformedRead(format!("Failed to read upload: {}", e)))
        };

        let analysis = ingest(&state, kind, &file_name, content_type.as_deref(), read).await?;
        return Ok(Json(analysis));
    }

    Err(AppError::InvalidInput("Missing multipart field 'file'".to_string()))
}

async fn upload_from_url(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<UploadKind>,
    Json(remote): Json<RemoteFile>,
) -> Result<Json<UploadAnalysis>, AppError> {
    tracing::info!("Fetching {} from URL, length: {}", remote.file_name, remote.signed_url.len());
    let read = file_processor::load_file_from_url(&remote.signed_url);
    let analysis = ingest(&state, kind, &remote.file_name, None, read).await?;
    Ok(Json(analysis))
}

async fn upload_state(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<UploadKind>,
) -> Json<UploadState> {
    Json(state.uploads.state(kind))
}

async fn reset_upload(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<UploadKind>,
) -> Json<UploadState> {
    state.uploads.reset(kind);
    tracing::info!("Upload slot {} reset", kind.label());
    Json(state.uploads.state(kind))
}

async fn process_uploads(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProcessSummary>, AppError> {
    let summary = state.uploads.process()?;
    tracing::info!(
        "Processed uploads: {} products rows, {} sales rows",
        summary.products.preview.total_rows,
        summary.sales.preview.total_rows
    );
    Ok(Json(summary))
}
