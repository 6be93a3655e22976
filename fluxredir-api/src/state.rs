//! Shared application state for the resolver router.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    http::{HeaderMap, Uri},
    response::Response,
};

use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::redirect::{found, original_url, with_provenance, ForumBase};
use crate::store::MappingStore;

/// State handed to every handler. Cloning is cheap; the store is shared.
#[derive(Clone)]
pub struct AppState {
    /// Correspondence store (the pooled database client in production).
    pub store: Arc<dyn MappingStore>,
    pub forum: ForumBase,
    /// Authority used for provenance URLs when the request has none.
    pub public_host: Option<String>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn MappingStore>, config: &ApiConfig) -> Self {
        Self {
            store,
            forum: ForumBase::new(&config.forum_url),
            public_host: config.public_host.clone(),
            start_time: Instant::now(),
        }
    }

    /// 302 to `destination`, tagged with the URL this request arrived on.
    pub fn redirect_from(
        &self,
        destination: &str,
        uri: &Uri,
        headers: &HeaderMap,
    ) -> ApiResult<Response> {
        let original = original_url(uri, headers, self.public_host.as_deref());
        found(&with_provenance(destination, &original))
    }
}
