//! Redirect Routes Module
//!
//! - `/viewtopic.php` topic and post permalinks
//! - `/profile.php` user profile permalinks
//! - `/noredir`, `/yesredir` opt-out cookie toggles
//! - `/health/*` and `/metrics`
//! - everything else is passed through to the same path on the forum

pub mod fallback;
pub mod health;
pub mod optout;
pub mod profile;
pub mod topic;

use std::future::Future;
use std::time::Instant;

use axum::{middleware::from_fn, routing::get, Router};

use crate::error::ApiResult;
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware, METRICS};

/// Query string as ordered key/value pairs, repeated keys kept.
pub type QueryPairs = Vec<(String, String)>;

/// First value of `key` in the query string.
pub fn query_value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Run a store lookup, recording its latency and outcome under `kind`.
pub(crate) async fn timed_lookup<T, F>(kind: &'static str, lookup: F) -> ApiResult<Option<T>>
where
    F: Future<Output = ApiResult<Option<T>>>,
{
    let start = Instant::now();
    let result = lookup.await;

    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_lookup(kind, start.elapsed().as_secs_f64());
        let outcome = match &result {
            Ok(Some(_)) => "found",
            Ok(None) => "not_found",
            Err(_) => "error",
        };
        metrics.record_redirect(kind, outcome);
    }

    result
}

/// Create the complete resolver router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/viewtopic.php", get(topic::viewtopic))
        .route("/profile.php", get(profile::profile))
        .route("/noredir", get(optout::noredir))
        .route("/yesredir", get(optout::yesredir))
        .nest("/health", health::create_router())
        .route("/metrics", get(metrics_handler))
        .fallback(fallback::passthrough)
        .with_state(state)
        .layer(from_fn(observability_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_value_first_match() {
        let params: QueryPairs = vec![
            ("pid".to_string(), "5".to_string()),
            ("id".to_string(), "1".to_string()),
            ("id".to_string(), "2".to_string()),
        ];
        assert_eq!(query_value(&params, "id"), Some("1"));
        assert_eq!(query_value(&params, "pid"), Some("5"));
        assert_eq!(query_value(&params, "uid"), None);
    }
}
