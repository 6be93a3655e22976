//! Correspondence rows produced by the builder and read by the resolver.

use serde::{Deserialize, Serialize};

use crate::identity::LegacyId;

/// One row of the `users` correspondence table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserMapping {
    pub legacy_user_id: LegacyId,
    pub new_username: String,
}

/// One row of the `posts` correspondence table.
///
/// Several rows share a `legacy_topic_id`; every one of them carries the
/// same `new_topic_id` once the builder's consistency check has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostMapping {
    pub legacy_post_id: LegacyId,
    pub legacy_topic_id: LegacyId,
    pub new_topic_id: i32,
    pub new_topic_post_number: i32,
}

impl PostMapping {
    /// Where this post lives on the new platform.
    pub fn location(&self) -> PostLocation {
        PostLocation {
            topic_id: self.new_topic_id,
            post_number: self.new_topic_post_number,
        }
    }
}

/// A post's position on the new platform: its topic and ordinal within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostLocation {
    pub topic_id: i32,
    pub post_number: i32,
}
