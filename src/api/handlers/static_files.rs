use crate::api::error::AppError;
use axum::{
    body::Body,
    http::{StatusCode, header},
    response::Response,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::io::ErrorKind;
use std::path::Path;
use tokio_util::io::ReaderStream;

pub const XLSM_CONTENT_TYPE: &str = "application/vnd.ms-excel.sheet.macroEnabled.12";
pub const ICON_CONTENT_TYPE: &str = "image/vnd.microsoft.icon";

/// RFC 5987 attr-chars that may stay unescaped in `filename*`
const FILENAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'-')
    .remove(b'_');

/// Builds an attachment `Content-Disposition` with an ASCII fallback name and
/// the exact UTF-8 name.
pub fn attachment_disposition(filename: &str) -> String {
    let ascii_filename = filename
        .chars()
        .filter(|c| c.is_ascii() && !c.is_control() && *c != '"' && *c != '\\' && *c != ';')
        .take(64)
        .collect::<String>();
    let fallback_filename = if ascii_filename.is_empty() {
        "file"
    } else {
        &ascii_filename
    };

    let encoded_filename = utf8_percent_encode(filename, FILENAME_ENCODE_SET);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback_filename, encoded_filename
    )
}

/// Streams a file from disk. A missing path (or one that is not a regular
/// file) is a 404.
pub async fn send_static_file(
    path: &Path,
    content_type: &str,
    disposition: Option<String>,
) -> Result<Response, AppError> {
    let file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!(
                "{} not found",
                display_name(path)
            )));
        }
        Err(e) => {
            return Err(AppError::Internal(format!(
                "Failed to open {}: {}",
                path.display(),
                e
            )));
        }
    };

    let metadata = file
        .metadata()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to stat {}: {}", path.display(), e)))?;
    if !metadata.is_file() {
        return Err(AppError::NotFound(format!(
            "{} not found",
            display_name(path)
        )));
    }

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, metadata.len());
    if let Some(disposition) = disposition {
        builder = builder.header(header::CONTENT_DISPOSITION, disposition);
    }

    builder
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "File".to_string())
}
