use axum::extract::Multipart;
use axum::extract::multipart::Field;
use common::storage::{AssetDir, AssetStore, BoxReader};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::ingest::form::{RawForm, UploadedFile};
use crate::utils::filename::{check_image_mime, image_extension, stored_file_name};

/// Read a multipart model form, writing every file part to the asset store.
///
/// Files are stored before any database work starts. File inputs left empty
/// by the browser (no file name or zero bytes) are ignored. If anything fails
/// part-way, the files already stored for this request are removed again.
pub async fn receive_form(
    mut multipart: Multipart,
    store: &dyn AssetStore,
    max_size: u64,
) -> Result<RawForm, AppError> {
    let mut form = RawForm::new();

    let result = async {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            let file_name = field.file_name().map(str::to_string);
            match file_name {
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?;
                    form.insert_field(name, text);
                }
                Some(file_name) if file_name.trim().is_empty() => {
                    // Unselected file input.
                    drop(field);
                }
                Some(file_name) => {
                    if form.file(&name).is_some() {
                        continue;
                    }
                    let ext = image_extension(&file_name)
                        .map_err(|e| AppError::Validation(e.message().into()))?;
                    check_image_mime(field.content_type())
                        .map_err(|e| AppError::Validation(e.message().into()))?;

                    let dir = AssetDir::for_field(&name);
                    let stored_name = stored_file_name(&name, &ext);
                    if let Some(path) =
                        stream_field_to_store(field, store, dir, &stored_name, max_size).await?
                    {
                        debug!(field = %name, path = %path, "Stored upload");
                        form.push_file(UploadedFile {
                            field_name: name,
                            path,
                        });
                    }
                }
            }
        }
        Ok::<(), AppError>(())
    }
    .await;

    match result {
        Ok(()) => Ok(form),
        Err(e) => {
            discard_uploads(store, &form.upload_paths()).await;
            Err(e)
        }
    }
}

/// Remove files stored for a request that will not be used.
pub async fn discard_uploads(store: &dyn AssetStore, paths: &[String]) {
    for path in paths {
        if let Err(e) = store.delete(path).await {
            warn!(path = %path, error = %e, "Failed to remove upload");
        }
    }
}

/// Spool a file part to a temp file, then hand it to the store.
///
/// Returns `None` for a zero-byte part.
async fn stream_field_to_store(
    mut field: Field<'_>,
    store: &dyn AssetStore,
    dir: AssetDir,
    file_name: &str,
    max_size: u64,
) -> Result<Option<String>, AppError> {
    let temp_path = std::env::temp_dir().join(format!("catalog-upload-{}", Uuid::new_v4()));

    let result = async {
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

        let mut total_size: u64 = 0;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
        {
            total_size += chunk.len() as u64;
            if total_size > max_size {
                return Err(AppError::Validation(format!(
                    "File exceeds maximum size of {max_size} bytes"
                )));
            }
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to write temp file: {e}")))?;
        }
        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to flush temp file: {e}")))?;
        drop(temp_file);

        if total_size == 0 {
            return Ok(None);
        }

        let file = tokio::fs::File::open(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to reopen temp file: {e}")))?;
        let reader: BoxReader = Box::new(file);
        let path = store.put_stream(dir, file_name, reader).await?;
        Ok(Some(path))
    }
    .await;

    // Best effort.
    let _ = tokio::fs::remove_file(&temp_path).await;
    result
}
