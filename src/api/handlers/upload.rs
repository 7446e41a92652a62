use crate::AppState;
use crate::api::error::AppError;
use crate::services::upload::{UploadedFile, base_filename};
use axum::{
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use bytes::BytesMut;
use tracing::info;

/// Name of the form field carrying the file.
pub const FILE_FIELD: &str = "file";

pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<String, AppError> {
    let mut multipart = multipart.map_err(|e| {
        AppError::BadRequest(format!("No file in request: {}", e.body_text()))
    })?;

    let file = read_file_field(&mut multipart, state.config.max_upload_size).await?;
    let filename = file.filename.clone();

    let stored = state.uploader.forward(file).await?;
    info!(
        "☁️  Stored {} as {} ({}, {} bytes)",
        filename, stored.key, stored.content_type, stored.size
    );

    Ok(format!("File uploaded successfully : {}", filename))
}

/// Reads the first `file` part that carries a filename. Other parts are skipped.
async fn read_file_field(
    multipart: &mut Multipart,
    max_size: usize,
) -> Result<UploadedFile, AppError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().and_then(base_filename).map(str::to_string) else {
            continue;
        };

        let mut body = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if body.len() + chunk.len() > max_size {
                return Err(AppError::PayloadTooLarge(format!(
                    "{} exceeds the {} byte upload limit",
                    filename, max_size
                )));
            }
            body.extend_from_slice(&chunk);
        }

        return Ok(UploadedFile::new(filename, body.freeze()));
    }

    Err(AppError::BadRequest("No file in request".to_string()))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(err.body_text())
    }
}
