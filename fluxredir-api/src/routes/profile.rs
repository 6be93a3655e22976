//! `/profile.php` - user profile permalinks.

use axum::{
    extract::{OriginalUri, Query, State},
    http::HeaderMap,
    response::Response,
};
use fluxredir_core::{parse_legacy_id, LegacyId};

use super::{query_value, timed_lookup, QueryPairs};
use crate::error::{ApiError, ApiResult};
use crate::redirect::ForumBase;
use crate::state::AppState;
use crate::store::MappingStore;
use crate::telemetry::METRICS;

/// Resolve an optional legacy user id to its destination URL.
pub async fn resolve_profile(
    store: &dyn MappingStore,
    forum: &ForumBase,
    legacy_user_id: Option<LegacyId>,
) -> ApiResult<String> {
    let Some(legacy_user_id) = legacy_user_id else {
        if let Ok(metrics) = METRICS.as_ref() {
            metrics.record_redirect("root", "default");
        }
        return Ok(forum.root());
    };

    let username = timed_lookup("user", store.username_for_legacy_user(legacy_user_id))
        .await?
        .ok_or_else(|| ApiError::mapping_not_found("user", legacy_user_id))?;
    tracing::debug!(legacy_user_id, username = %username, "Resolved legacy user");

    Ok(forum.user(&username))
}

/// GET /profile.php
pub async fn profile(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(params): Query<QueryPairs>,
) -> ApiResult<Response> {
    let legacy_user_id = parse_legacy_id(query_value(&params, "id"));
    let destination = resolve_profile(state.store.as_ref(), &state.forum, legacy_user_id).await?;
    state.redirect_from(&destination, &uri, &headers)
}
