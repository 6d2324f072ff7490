use crate::AppState;
use crate::api::error::AppError;
use crate::services::intake::IntakeError;
use crate::utils::auth::Principal;
use axum::{
    Extension, Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

/// Form accepted by both upload endpoints.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct InputUploadForm {
    /// Workbook with an `.xlsx` or `.xlsm` name
    #[schema(value_type = String, format = Binary)]
    pub input_file: Vec<u8>,
}

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub user: String,
    /// Slot path relative to the upload root
    pub slot: String,
    pub size: u64,
    pub sha256: String,
    pub index_url: String,
}

fn redirect_to_index() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}

fn too_large(state: &AppState, e: IntakeError) -> Response {
    debug!("Upload rejected: body exceeds {} bytes", state.config.max_content_length);
    (StatusCode::PAYLOAD_TOO_LARGE, e.to_string()).into_response()
}

/// Browser form target. Every validation outcome, accepted or not, ends in a
/// `302` back to the index page; only an oversized body (413) or a storage
/// failure (500) is answered differently.
#[utoipa::path(
    post,
    path = "/input_upload",
    request_body(content = InputUploadForm, content_type = "multipart/form-data"),
    params(
        ("X-MS-CLIENT-PRINCIPAL-NAME" = Option<String>, Header, description = "Signed-in principal injected by the platform")
    ),
    responses(
        (status = 302, description = "Redirect to the index page"),
        (status = 413, description = "File is too large"),
        (status = 500, description = "Upload could not be stored")
    ),
    tag = "files"
)]
pub async fn input_upload(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    debug!("Request for input upload received");

    if let Err(e) = state.intake.check_declared_length(&headers) {
        return Ok(too_large(&state, e));
    }

    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            debug!("No file part in the request ({})", rejection.body_text());
            return Ok(redirect_to_index());
        }
    };

    match state.intake.receive(&principal, multipart).await {
        Ok(_) => Ok(redirect_to_index()),
        Err(e @ IntakeError::PayloadTooLarge) => Ok(too_large(&state, e)),
        Err(e) if e.is_rejection() => {
            debug!("Upload rejected for user {}: {}", principal.user, e);
            Ok(redirect_to_index())
        }
        Err(e) => Err(e.into()),
    }
}

/// Same storage semantics as `/input_upload`, with explicit status codes and
/// a JSON body instead of a redirect.
#[utoipa::path(
    post,
    path = "/api/input_upload",
    request_body(content = InputUploadForm, content_type = "multipart/form-data"),
    params(
        ("X-MS-CLIENT-PRINCIPAL-NAME" = Option<String>, Header, description = "Signed-in principal injected by the platform")
    ),
    responses(
        (status = 201, description = "Input stored", body = UploadResponse),
        (status = 400, description = "Missing file part, empty filename or unusable principal"),
        (status = 413, description = "Request body exceeds the configured limit"),
        (status = 415, description = "File extension not allowed"),
        (status = 500, description = "Upload could not be stored")
    ),
    tag = "files"
)]
pub async fn api_input_upload(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    state.intake.check_declared_length(&headers)?;

    let multipart = multipart.map_err(|rejection| {
        AppError::from(IntakeError::Malformed(rejection.body_text()))
    })?;

    let stored = state.intake.receive(&principal, multipart).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            slot: format!("{}/{}", stored.user, state.config.input_file_name),
            user: stored.user,
            size: stored.size,
            sha256: stored.sha256,
            index_url: external_index_url(&state.config.preferred_url_scheme, &headers),
        }),
    ))
}

/// Absolute index URL for the requesting host, or `/` without a Host header.
fn external_index_url(scheme: &str, headers: &HeaderMap) -> String {
    headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
        .map(|host| format!("{}://{}/", scheme, host))
        .unwrap_or_else(|| "/".to_string())
}
