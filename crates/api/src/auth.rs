use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::AppState;

/// Middleware enforcing `Authorization: Bearer <DASHBOARD_TOKEN>` on the
/// protected routes. An empty configured token rejects everyone.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    match bearer_token(&headers) {
        Some(t) if !state.dashboard_token.is_empty() && t == state.dashboard_token => {
            next.run(request).await
        }
        _ => {
            warn!(path = %request.uri().path(), "Rejected unauthenticated API request");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "unauthorized"})),
            )
                .into_response()
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}
