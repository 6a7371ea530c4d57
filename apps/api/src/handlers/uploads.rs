//! Multipart and binary response helpers shared by upload handlers.

use axum::extract::Multipart;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use fieldtrack_core::{AppError, AppResult};

/// File part of a multipart form.
pub(super) struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Parsed multipart form: the first file part plus text fields.
#[derive(Default)]
pub(super) struct UploadForm {
    pub file: Option<UploadedFile>,
    pub fields: Vec<(String, String)>,
}

impl UploadForm {
    /// Returns a trimmed, non-empty text field.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }

    /// Takes the file part or fails when the form carried none.
    pub fn require_file(&mut self, field: &str) -> AppResult<UploadedFile> {
        self.file
            .take()
            .ok_or_else(|| AppError::Validation(format!("multipart field '{field}' is required")))
    }
}

/// Reads a form whose file part is named `file_field`.
pub(super) async fn read_upload_form(
    mut multipart: Multipart,
    file_field: &str,
) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::Validation(format!("malformed multipart body: {error}")))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        if name == file_field {
            let filename = field.file_name().unwrap_or("upload").to_owned();
            let bytes = field.bytes().await.map_err(|error| {
                AppError::Validation(format!("failed to read '{name}' upload: {error}"))
            })?;
            form.file = Some(UploadedFile {
                filename,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field.text().await.map_err(|error| {
                AppError::Validation(format!("failed to read field '{name}': {error}"))
            })?;
            form.fields.push((name, value));
        }
    }

    Ok(form)
}

/// Serves stored image bytes with a sniffed content type.
pub(super) fn image_response(bytes: Vec<u8>) -> Response {
    let content_type = if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"\x89PNG") {
        "image/png"
    } else {
        "application/octet-stream"
    };

    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "private, max-age=300"),
        ],
        bytes,
    )
        .into_response()
}
