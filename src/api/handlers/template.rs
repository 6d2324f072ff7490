use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::static_files::{
    XLSM_CONTENT_TYPE, attachment_disposition, send_static_file,
};
use axum::{extract::State, response::Response};
use tracing::debug;

/// Serves the blank input template as a download.
#[utoipa::path(
    get,
    path = "/template_download",
    responses(
        (status = 200, description = "Template workbook attachment"),
        (status = 404, description = "Template not installed")
    ),
    tag = "files"
)]
pub async fn template_download(State(state): State<AppState>) -> Result<Response, AppError> {
    debug!("Request for template download received");
    let name = &state.config.template_file_name;
    send_static_file(
        &state.config.static_dir.join(name),
        XLSM_CONTENT_TYPE,
        Some(attachment_disposition(name)),
    )
    .await
}
