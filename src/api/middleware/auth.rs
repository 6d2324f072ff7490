use crate::AppState;
use crate::utils::auth::Principal;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Resolves the platform-asserted principal and makes it available to
/// handlers as `Extension<Principal>`. Requests are never rejected here; a
/// missing header maps to the configured default user. The principal is also
/// attached to the response so the access log can name the user.
pub async fn principal_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let principal = Principal::from_header(
        req.headers().get(state.config.principal_header.as_str()),
        &state.config.default_user,
    );

    tracing::debug!(
        user = %principal.user,
        asserted = principal.asserted.is_some(),
        "Resolved principal"
    );

    req.extensions_mut().insert(principal.clone());
    let mut response = next.run(req).await;
    response.extensions_mut().insert(principal);
    response
}
