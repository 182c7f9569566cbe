use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use common::asset_path::{escapes_root, normalize};
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Serve a stored upload from the public asset tree.
#[instrument(skip(state))]
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(file_path): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let canonical = normalize(&format!("/uploads/{file_path}"))
        .filter(|p| !escapes_root(p))
        .ok_or_else(|| AppError::NotFound("Asset not found".to_string()))?;

    let reader = state.store.get_stream(&canonical).await?;
    let mime = mime_guess::from_path(&canonical).first_or_octet_stream();

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError::Internal(e.to_string()))
}
