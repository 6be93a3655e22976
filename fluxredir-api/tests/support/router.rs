//! Helpers for driving the resolver router in-process.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use fluxredir_api::{create_router, ApiConfig, AppState, MappingStore, PROVENANCE_PARAM};
use fluxredir_test_utils::fixtures::{FORUM_URL, PUBLIC_HOST};
use tower::ServiceExt;

/// Router over `store`, forum base `FORUM_URL`.
pub fn test_app(store: Arc<dyn MappingStore>) -> Router {
    let config = ApiConfig {
        forum_url: FORUM_URL.to_string(),
        public_host: Some(PUBLIC_HOST.to_string()),
        ..ApiConfig::default()
    };
    create_router(AppState::new(store, &config))
}

/// GET `uri` with `Host: PUBLIC_HOST`.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(header::HOST, PUBLIC_HOST)
        .body(Body::empty())
        .expect("valid request");
    app.oneshot(request).await.unwrap_or_else(|e| match e {})
}

/// The `Location` header of a response.
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("Location header")
        .to_string()
}

/// Split a redirect target into the destination without its provenance
/// parameter and the decoded provenance value.
pub fn split_provenance(location: &str) -> (String, Option<String>) {
    let Some((base, query)) = location.split_once('?') else {
        return (location.to_string(), None);
    };

    let mut kept = Vec::new();
    let mut provenance = None;
    for pair in query.split('&') {
        match pair.split_once('=') {
            Some((key, value)) if key == PROVENANCE_PARAM => {
                provenance = Some(
                    urlencoding::decode(value)
                        .expect("utf-8 provenance")
                        .into_owned(),
                );
            }
            _ => kept.push(pair),
        }
    }

    if kept.is_empty() {
        (base.to_string(), provenance)
    } else {
        (format!("{}?{}", base, kept.join("&")), provenance)
    }
}

/// All `Set-Cookie` header values.
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}
