use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use sheet_intake::config::AppConfig;
use sheet_intake::{AppState, create_app};
use tempfile::TempDir;
use tower::ServiceExt;

const TEMPLATE_BYTES: &[u8] = b"PK\x03\x04 template workbook";
const ICON_BYTES: &[u8] = b"\x00\x00\x01\x00 icon";

fn setup_app(with_assets: bool) -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let static_dir = dir.path().join("static");
    std::fs::create_dir_all(&static_dir).unwrap();
    if with_assets {
        std::fs::write(static_dir.join("template.xlsm"), TEMPLATE_BYTES).unwrap();
        std::fs::write(static_dir.join("favicon.ico"), ICON_BYTES).unwrap();
    }

    let config = AppConfig {
        upload_path: dir.path().join("uploads"),
        static_dir,
        ..AppConfig::development()
    };
    (create_app(AppState::new(config)), dir)
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_template_download_is_attachment() {
    let (app, _dir) = setup_app(true);

    for method in ["GET", "POST"] {
        let response = app
            .clone()
            .oneshot(request(method, "/template_download"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{} /template_download", method);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/vnd.ms-excel.sheet.macroEnabled.12"
        );
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment;"));
        assert!(disposition.contains("filename=\"template.xlsm\""));
        assert_eq!(
            response.headers()[header::CONTENT_LENGTH],
            TEMPLATE_BYTES.len().to_string().as_str()
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], TEMPLATE_BYTES);
    }
}

#[tokio::test]
async fn test_missing_assets_are_404() {
    let (app, _dir) = setup_app(false);

    let response = app
        .clone()
        .oneshot(request("GET", "/template_download"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(request("GET", "/favicon.ico"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_favicon_content_type() {
    let (app, _dir) = setup_app(true);

    let response = app
        .oneshot(request("GET", "/favicon.ico"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "image/vnd.microsoft.icon"
    );
    assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], ICON_BYTES);
}

#[tokio::test]
async fn test_index_page_renders_upload_form() {
    let (app, _dir) = setup_app(false);

    let response = app.oneshot(request("GET", "/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("action=\"/input_upload\""));
    assert!(html.contains("name=\"input_file\""));
    assert!(html.contains("/template_download"));
}

#[tokio::test]
async fn test_output_download_is_not_implemented() {
    let (app, _dir) = setup_app(true);

    let response = app
        .clone()
        .oneshot(request("POST", "/output_download"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

    let response = app
        .oneshot(request("GET", "/output_download"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_upload_route_only_accepts_post() {
    let (app, _dir) = setup_app(false);

    let response = app
        .oneshot(request("GET", "/input_upload"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_health_reports_upload_root() {
    let (app, dir) = setup_app(false);

    let response = app
        .clone()
        .oneshot(request("GET", "/health"))
        .await
        .unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["upload_root"], "unavailable");

    std::fs::create_dir_all(dir.path().join("uploads")).unwrap();
    let response = app.oneshot(request("GET", "/health")).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["upload_root"], "writable");
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let (app, _dir) = setup_app(false);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");

    let response = app.oneshot(request("GET", "/health")).await.unwrap();
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(generated.len(), 36);
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let (app, _dir) = setup_app(false);

    let response = app
        .oneshot(request("GET", "/api-docs/openapi.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    for path in [
        "/",
        "/favicon.ico",
        "/template_download",
        "/input_upload",
        "/api/input_upload",
        "/output_download",
        "/health",
    ] {
        assert!(json["paths"].get(path).is_some(), "missing {}", path);
    }
}
