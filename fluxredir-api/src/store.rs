//! Read-only access to the correspondence tables.

use async_trait::async_trait;
use fluxredir_core::{LegacyId, PostLocation};

use crate::error::ApiResult;

/// Lookups the resolver performs against the correspondence store.
///
/// `Ok(None)` means the identifier has no mapping; `Err` means the store
/// itself could not be reached.
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// New topic id of any post whose legacy topic is `legacy_topic_id`.
    async fn topic_for_legacy_topic(&self, legacy_topic_id: LegacyId) -> ApiResult<Option<i32>>;

    /// New topic and post number of the legacy post.
    async fn location_for_legacy_post(
        &self,
        legacy_post_id: LegacyId,
    ) -> ApiResult<Option<PostLocation>>;

    /// New username of the legacy user.
    async fn username_for_legacy_user(&self, legacy_user_id: LegacyId)
        -> ApiResult<Option<String>>;

    /// Check that the store is reachable.
    async fn ping(&self) -> ApiResult<()>;
}
