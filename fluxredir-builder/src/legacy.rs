//! Legacy FluxBB post source.

use std::collections::HashSet;

use async_trait::async_trait;
use fluxredir_core::LegacyId;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

use crate::config::LegacyConfig;
use crate::error::{BuildError, BuildResult};

/// A legacy post and the legacy topic it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LegacyPost {
    pub post_id: LegacyId,
    pub topic_id: LegacyId,
}

impl LegacyPost {
    /// Convert ids as read from MySQL, which stores them unsigned.
    pub fn from_raw(post_id: i64, topic_id: i64) -> BuildResult<Self> {
        match (LegacyId::try_from(post_id), LegacyId::try_from(topic_id)) {
            (Ok(post_id), Ok(topic_id)) => Ok(Self { post_id, topic_id }),
            _ => Err(BuildError::LegacyIdOutOfRange { post_id, topic_id }),
        }
    }
}

/// Where the builder gets legacy post/topic pairs from.
#[async_trait]
pub trait LegacySource: Send + Sync {
    /// Every legacy post with its topic.
    async fn fetch_posts(&self) -> BuildResult<Vec<LegacyPost>>;
}

/// Check a FluxBB table prefix. The empty prefix is valid.
pub fn validate_table_prefix(prefix: &str) -> BuildResult<()> {
    if prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(BuildError::InvalidPrefix {
            prefix: prefix.to_string(),
        })
    }
}

/// Reject a post list in which a legacy post id repeats.
pub fn ensure_unique_posts(posts: &[LegacyPost]) -> BuildResult<()> {
    let mut seen = HashSet::with_capacity(posts.len());
    for post in posts {
        if !seen.insert(post.post_id) {
            return Err(BuildError::DuplicateLegacyPost {
                legacy_post_id: post.post_id,
            });
        }
    }
    Ok(())
}

/// FluxBB's MySQL database.
pub struct MySqlLegacySource {
    pool: MySqlPool,
    posts_table: String,
}

impl MySqlLegacySource {
    /// Build a source over `pool` reading `<prefix>posts`.
    pub fn new(pool: MySqlPool, prefix: &str) -> BuildResult<Self> {
        validate_table_prefix(prefix)?;
        Ok(Self {
            pool,
            posts_table: format!("{}posts", prefix),
        })
    }

    /// Lazily connecting source; nothing is opened until the first fetch.
    pub fn from_config(config: &LegacyConfig) -> BuildResult<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect_lazy_with(config.connect_options());
        Self::new(pool, &config.prefix)
    }

    pub fn posts_table(&self) -> &str {
        &self.posts_table
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl LegacySource for MySqlLegacySource {
    async fn fetch_posts(&self) -> BuildResult<Vec<LegacyPost>> {
        let sql = format!(
            "SELECT CAST(id AS SIGNED), CAST(topic_id AS SIGNED) FROM {}",
            self.posts_table
        );
        let rows: Vec<(i64, i64)> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        tracing::debug!(table = %self.posts_table, rows = rows.len(), "Fetched legacy posts");

        rows.into_iter()
            .map(|(post_id, topic_id)| LegacyPost::from_raw(post_id, topic_id))
            .collect()
    }
}

/// Fixed post list, for runs whose legacy data is already in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticLegacySource {
    posts: Vec<LegacyPost>,
}

impl StaticLegacySource {
    pub fn new(posts: Vec<LegacyPost>) -> Self {
        Self { posts }
    }
}

#[async_trait]
impl LegacySource for StaticLegacySource {
    async fn fetch_posts(&self) -> BuildResult<Vec<LegacyPost>> {
        Ok(self.posts.clone())
    }
}
