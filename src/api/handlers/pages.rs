use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::static_files::{ICON_CONTENT_TYPE, send_static_file};
use axum::{
    extract::State,
    response::{Html, Response},
};
use tracing::debug;

const INDEX_HTML: &str = include_str!("../../../templates/index.html");

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Upload page")
    ),
    tag = "pages"
)]
pub async fn index() -> Html<&'static str> {
    debug!("Request for index page received");
    Html(INDEX_HTML)
}

#[utoipa::path(
    get,
    path = "/favicon.ico",
    responses(
        (status = 200, description = "Site icon"),
        (status = 404, description = "Icon not installed")
    ),
    tag = "pages"
)]
pub async fn favicon(State(state): State<AppState>) -> Result<Response, AppError> {
    debug!("Request for favicon received");
    send_static_file(
        &state.config.static_dir.join("favicon.ico"),
        ICON_CONTENT_TYPE,
        None,
    )
    .await
}
