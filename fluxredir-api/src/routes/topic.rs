//! `/viewtopic.php` - topic and post permalinks.

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

/// What a topic-view request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicTarget {
    /// `?id=<legacy topic id>`
    Topic(LegacyId),
    /// `?pid=<legacy post id>`
    Post(LegacyId),
    /// No usable identifier
    Forum,
}

impl TopicTarget {
    /// `id` wins over `pid`; unusable values count as absent.
    pub fn from_query(params: &[(String, String)]) -> Self {
        if let Some(id) = parse_legacy_id(query_value(params, "id")) {
            TopicTarget::Topic(id)
        } else if let Some(pid) = parse_legacy_id(query_value(params, "pid")) {
            TopicTarget::Post(pid)
        } else {
            TopicTarget::Forum
        }
    }
}

/// Resolve a topic-view target to its destination URL.
pub async fn resolve_topic_target(
    store: &dyn MappingStore,
    forum: &ForumBase,
    target: TopicTarget,
) -> ApiResult<String> {
    match target {
        TopicTarget::Topic(legacy_topic_id) => {
            let topic_id = timed_lookup("topic", store.topic_for_legacy_topic(legacy_topic_id))
                .await?
                .ok_or_else(|| ApiError::mapping_not_found("topic", legacy_topic_id))?;
            tracing::debug!(legacy_topic_id, topic_id, "Resolved legacy topic");
            Ok(forum.topic(topic_id))
        }
        TopicTarget::Post(legacy_post_id) => {
            let location = timed_lookup("post", store.location_for_legacy_post(legacy_post_id))
                .await?
                .ok_or_else(|| ApiError::mapping_not_found("post", legacy_post_id))?;
            tracing::debug!(
                legacy_post_id,
                topic_id = location.topic_id,
                post_number = location.post_number,
                "Resolved legacy post"
            );
            Ok(forum.post(location))
        }
        TopicTarget::Forum => {
            if let Ok(metrics) = METRICS.as_ref() {
                metrics.record_redirect("root", "default");
            }
            Ok(forum.root())
        }
    }
}

/// GET /viewtopic.php
pub async fn viewtopic(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(params): Query<QueryPairs>,
) -> ApiResult<Response> {
    let target = TopicTarget::from_query(&params);
    let destination = resolve_topic_target(state.store.as_ref(), &state.forum, target).await?;
    state.redirect_from(&destination, &uri, &headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> QueryPairs {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_target_from_query() {
        assert_eq!(TopicTarget::from_query(&pairs(&[("id", "77")])), TopicTarget::Topic(77));
        assert_eq!(TopicTarget::from_query(&pairs(&[("pid", "501")])), TopicTarget::Post(501));
        assert_eq!(TopicTarget::from_query(&pairs(&[])), TopicTarget::Forum);
    }

    #[test]
    fn test_id_wins_over_pid() {
        assert_eq!(
            TopicTarget::from_query(&pairs(&[("pid", "501"), ("id", "77")])),
            TopicTarget::Topic(77)
        );
    }

    #[test]
    fn test_malformed_id_falls_through() {
        assert_eq!(
            TopicTarget::from_query(&pairs(&[("id", "abc"), ("pid", "501")])),
            TopicTarget::Post(501)
        );
        assert_eq!(
            TopicTarget::from_query(&pairs(&[("id", ""), ("pid", "x")])),
            TopicTarget::Forum
        );
    }

    #[test]
    fn test_first_value_wins() {
        assert_eq!(
            TopicTarget::from_query(&pairs(&[("id", "1"), ("id", "2")])),
            TopicTarget::Topic(1)
        );
    }
}
