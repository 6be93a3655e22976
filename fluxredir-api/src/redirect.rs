//! Destination URLs and redirect responses.
//!
//! Builds Discourse URLs from resolved mappings, reconstructs the URL the
//! client originally requested, and attaches it to every destination as the
//! `redirected_from` query parameter.

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use fluxredir_core::PostLocation;

use crate::error::{ApiError, ApiResult};

/// Query parameter carrying the original request URL.
pub const PROVENANCE_PARAM: &str = "redirected_from";

/// Base URL of the forum, normalized to end with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumBase {
    url: String,
}

impl ForumBase {
    pub fn new(url: &str) -> Self {
        Self {
            url: crate::config::normalize_forum_url(url),
        }
    }

    /// The bare forum URL.
    pub fn root(&self) -> String {
        self.url.clone()
    }

    /// `<base>t/topic/<topic>`
    pub fn topic(&self, topic_id: i32) -> String {
        format!("{}t/topic/{}", self.url, topic_id)
    }

    /// `<base>t/topic/<topic>/<post_number>`
    pub fn post(&self, location: PostLocation) -> String {
        format!(
            "{}t/topic/{}/{}",
            self.url, location.topic_id, location.post_number
        )
    }

    /// `<base>u/<username>`, with the username percent-encoded as a path segment.
    pub fn user(&self, username: &str) -> String {
        format!("{}u/{}", self.url, urlencoding::encode(username))
    }

    /// The base followed by the request's path and query, minus its leading `/`.
    pub fn passthrough(&self, path_and_query: &str) -> String {
        format!("{}{}", self.url, path_and_query.trim_start_matches('/'))
    }
}

/// Rebuild the URL the client requested, always with the `https` scheme.
///
/// The service sits behind a TLS-terminating proxy, so the scheme the
/// request arrived with is ignored. The authority comes from the request
/// target when it is absolute, then the `Host` header, then `fallback_host`.
pub fn original_url(uri: &Uri, headers: &HeaderMap, fallback_host: Option<&str>) -> String {
    let authority = uri
        .authority()
        .map(|a| a.as_str().to_string())
        .or_else(|| {
            headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .map(|h| h.to_string())
        })
        .or_else(|| fallback_host.map(|h| h.to_string()))
        .unwrap_or_else(|| "localhost".to_string());

    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    format!("https://{}{}", authority, path_and_query)
}

/// Whether a raw `key[=value]` pair names the provenance parameter, after
/// percent-decoding the key.
fn is_provenance_pair(pair: &str) -> bool {
    let key = pair.split_once('=').map(|(key, _)| key).unwrap_or(pair);
    match urlencoding::decode(key) {
        Ok(decoded) => decoded == PROVENANCE_PARAM,
        Err(_) => key == PROVENANCE_PARAM,
    }
}

/// Append `redirected_from=<original>` to `destination`, replacing any
/// provenance parameter already present and keeping every other one.
pub fn with_provenance(destination: &str, original: &str) -> String {
    let (base, query) = match destination.split_once('?') {
        Some((base, query)) => (base, query),
        None => (destination, ""),
    };

    let mut pairs: Vec<String> = query
        .split('&')
        .filter(|pair| !pair.is_empty() && !is_provenance_pair(pair))
        .map(str::to_string)
        .collect();
    pairs.push(format!(
        "{}={}",
        PROVENANCE_PARAM,
        urlencoding::encode(original)
    ));

    format!("{}?{}", base, pairs.join("&"))
}

/// A `302 Found` response pointing at `location`.
pub fn found(location: &str) -> ApiResult<Response> {
    let value = HeaderValue::from_str(location).map_err(|e| {
        ApiError::internal_error(format!("Invalid redirect location {:?}: {}", location, e))
    })?;
    Ok((StatusCode::FOUND, [(header::LOCATION, value)]).into_response())
}
