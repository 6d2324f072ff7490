use crate::config::AppConfig;
use crate::services::upload_store::{LocalUploadStore, StoredInput};
use crate::utils::auth::Principal;
use crate::utils::validation::allowed_file;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::{HeaderMap, StatusCode, header};
use thiserror::Error;
use tracing::debug;

/// Multipart field carrying the spreadsheet
pub const INPUT_FIELD: &str = "input_file";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("No file part in the request")]
    MissingFilePart,

    #[error("No file selected")]
    NoFileSelected,

    #[error("File type not allowed: {0}")]
    ExtensionNotAllowed(String),

    #[error("Invalid principal: {0}")]
    InvalidIdentity(String),

    #[error("Malformed upload: {0}")]
    Malformed(String),

    #[error("File is too large")]
    PayloadTooLarge,

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl IntakeError {
    /// Client-side problems that the form endpoint answers with a plain redirect.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            IntakeError::MissingFilePart
                | IntakeError::NoFileSelected
                | IntakeError::ExtensionNotAllowed(_)
                | IntakeError::InvalidIdentity(_)
                | IntakeError::Malformed(_)
        )
    }
}

fn classify_multipart_error(err: MultipartError) -> IntakeError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        IntakeError::PayloadTooLarge
    } else {
        IntakeError::Malformed(err.body_text())
    }
}

/// Reads the rest of a form that has already been rejected. A body over the
/// cap is still reported as too large, whatever the rejection was.
async fn drain_form(multipart: &mut Multipart) -> Result<(), IntakeError> {
    loop {
        match multipart.next_field().await {
            Ok(Some(_)) => continue,
            Ok(None) => return Ok(()),
            Err(err) => {
                return match classify_multipart_error(err) {
                    IntakeError::PayloadTooLarge => Err(IntakeError::PayloadTooLarge),
                    _ => Ok(()),
                };
            }
        }
    }
}

/// Accepts the spreadsheet upload for a principal and places it in their slot.
#[derive(Debug, Clone)]
pub struct IntakeService {
    store: LocalUploadStore,
    allowed_extensions: Vec<String>,
    max_content_length: usize,
}

impl IntakeService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: LocalUploadStore::new(&config.upload_path, &config.input_file_name),
            allowed_extensions: config.upload_extensions.clone(),
            max_content_length: config.max_content_length,
        }
    }

    pub fn store(&self) -> &LocalUploadStore {
        &self.store
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    /// Refuses a request whose declared `Content-Length` is already over the
    /// cap, before any of the form is parsed.
    pub fn check_declared_length(&self, headers: &HeaderMap) -> Result<(), IntakeError> {
        let declared = headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        match declared {
            Some(len) if len > self.max_content_length as u64 => Err(IntakeError::PayloadTooLarge),
            _ => Ok(()),
        }
    }

    /// Filename and identity checks for the located file part.
    fn check_upload<'p>(
        &self,
        filename: &str,
        principal: &'p Principal,
    ) -> Result<&'p str, IntakeError> {
        if filename.is_empty() {
            return Err(IntakeError::NoFileSelected);
        }
        if !allowed_file(filename, &self.allowed_extensions) {
            return Err(IntakeError::ExtensionNotAllowed(filename.to_string()));
        }
        principal
            .folder()
            .map_err(|e| IntakeError::InvalidIdentity(e.message))
    }

    /// Scans the form for `input_file`, validates its filename and streams it
    /// into the principal's slot. Parts without a filename are not file parts
    /// and are skipped, as are all other fields. A rejected upload is read to
    /// the end first, so an oversized body always surfaces as `PayloadTooLarge`.
    pub async fn receive(
        &self,
        principal: &Principal,
        mut multipart: Multipart,
    ) -> Result<StoredInput, IntakeError> {
        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(classify_multipart_error)?
        {
            if field.name() != Some(INPUT_FIELD) {
                continue;
            }
            let Some(filename) = field.file_name().map(str::to_string) else {
                continue;
            };

            let user = match self.check_upload(&filename, principal) {
                Ok(user) => user,
                Err(rejection) => {
                    drop(field);
                    drain_form(&mut multipart).await?;
                    return Err(rejection);
                }
            };

            let mut staged = self.store.stage_input(user).await?;
            while let Some(chunk) = field.chunk().await.map_err(classify_multipart_error)? {
                staged.write_chunk(&chunk).await?;
            }
            let stored = staged.commit().await?;

            debug!(
                "User {} input saved at {} ({} bytes, sha256={})",
                stored.user,
                stored.path.display(),
                stored.size,
                stored.sha256
            );
            return Ok(stored);
        }

        Err(IntakeError::MissingFilePart)
    }
}
