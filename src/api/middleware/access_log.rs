use super::request_id::X_REQUEST_ID;
use crate::utils::auth::Principal;
use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

/// One line per request on the `access` target. Routes behind the principal
/// middleware also record the resolved user folder; a refused upload
/// (413 or 5xx) is logged at warn.
pub async fn access_log_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let request_id = req
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let response = next.run(req).await;

    let latency_ms = start.elapsed().as_millis();
    let status = response.status();
    let user = response
        .extensions()
        .get::<Principal>()
        .map(|p| p.user.as_str())
        .unwrap_or("-");

    if status.is_server_error() || status == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
        warn!(
            target: "access",
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            user = %user,
            request_id = %request_id,
            latency_ms = latency_ms,
            "request_refused"
        );
    } else {
        info!(
            target: "access",
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            user = %user,
            request_id = %request_id,
            latency_ms = latency_ms,
            "request_completed"
        );
    }

    response
}
