use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use crate::{auth::require_auth, AppState};

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 200;

/// Protected routes. The auth layer needs the real state up front.
pub fn api_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/signals", get(get_signals))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

#[derive(Deserialize)]
struct SignalsQuery {
    limit: Option<i64>,
}

async fn get_signals(
    State(state): State<AppState>,
    Query(q): Query<SignalsQuery>,
) -> (StatusCode, Json<Value>) {
    let limit = q.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    match state.store.recent(limit).await {
        Ok(signals) => (
            StatusCode::OK,
            Json(json!({
                "count": signals.len(),
                "signals": signals,
                "limit": limit,
            })),
        ),
        Err(e) => {
            error!(error = %e, "Failed to load signals");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "failed to load signals" })),
            )
        }
    }
}
