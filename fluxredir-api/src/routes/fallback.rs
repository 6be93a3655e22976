//! Catch-all: every other legacy path goes to the same path on the forum.

use axum::{
    extract::{OriginalUri, State},
    http::HeaderMap,
    response::Response,
};

use crate::error::ApiResult;
use crate::state::AppState;
use crate::telemetry::METRICS;

/// Any path without a dedicated route.
pub async fn passthrough(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let destination = state.forum.passthrough(path_and_query);

    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_redirect("passthrough", "default");
    }

    state.redirect_from(&destination, &uri, &headers)
}
