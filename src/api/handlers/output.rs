use crate::api::error::AppError;
use crate::utils::auth::Principal;
use axum::Extension;
use tracing::debug;

/// Placeholder for the processed-output download. No output is produced
/// anywhere yet, so the route answers 501 instead of an empty response.
#[utoipa::path(
    post,
    path = "/output_download",
    responses(
        (status = 501, description = "Output download is not implemented")
    ),
    tag = "files"
)]
pub async fn output_download(Extension(principal): Extension<Principal>) -> AppError {
    debug!("Request for output download received from {}", principal.user);
    AppError::NotImplemented("Output download is not available yet".to_string())
}
