pub mod api;
pub mod config;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::intake::IntakeService;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::pages::index,
        api::handlers::pages::favicon,
        api::handlers::template::template_download,
        api::handlers::upload::input_upload,
        api::handlers::upload::api_input_upload,
        api::handlers::output::output_download,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::upload::InputUploadForm,
            api::handlers::upload::UploadResponse,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "pages", description = "Browser pages"),
        (name = "files", description = "Template download and input upload"),
        (name = "system", description = "Operational endpoints")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub intake: Arc<IntakeService>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let intake = Arc::new(IntakeService::new(&config));
        Self {
            config: Arc::new(config),
            intake,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let principal = || from_fn_with_state(state.clone(), api::middleware::auth::principal_middleware);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(api::handlers::pages::index))
        .route("/favicon.ico", get(api::handlers::pages::favicon))
        .route(
            "/template_download",
            get(api::handlers::template::template_download)
                .post(api::handlers::template::template_download),
        )
        .route(
            "/input_upload",
            post(api::handlers::upload::input_upload).layer(principal()),
        )
        .route(
            "/api/input_upload",
            post(api::handlers::upload::api_input_upload).layer(principal()),
        )
        .route(
            "/output_download",
            post(api::handlers::output::output_download).layer(principal()),
        )
        .route("/health", get(api::handlers::health::health_check))
        .layer(DefaultBodyLimit::max(state.config.max_content_length))
        .layer(from_fn(api::middleware::access_log::access_log_middleware))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .with_state(state)
}
