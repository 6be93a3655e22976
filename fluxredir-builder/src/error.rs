//! Error types for the correspondence build.
//!
//! Every variant aborts the run; nothing is committed unless the whole
//! build succeeded.

use fluxredir_core::{ConfigError, CoreError, LegacyId};
use thiserror::Error;

/// Failures of a correspondence build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Invalid legacy table prefix {prefix:?}: only ASCII letters, digits and underscores are allowed")]
    InvalidPrefix { prefix: String },

    #[error("Legacy database error: {0}")]
    Legacy(#[from] sqlx::Error),

    #[error("Legacy post {post_id} (topic {topic_id}) does not fit a 32-bit id")]
    LegacyIdOutOfRange { post_id: i64, topic_id: i64 },

    #[error("Legacy post id {legacy_post_id} appears more than once")]
    DuplicateLegacyPost { legacy_post_id: LegacyId },

    #[error("Discourse database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("Discourse connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("{missing} of {staged} legacy posts have no imported Discourse post (first missing: {sample:?})")]
    UnmatchedPosts {
        staged: u64,
        missing: u64,
        sample: Vec<LegacyId>,
    },

    #[error("Legacy topic {legacy_topic_id} maps to several Discourse topics: {new_topic_ids:?}")]
    TopicSplit {
        legacy_topic_id: LegacyId,
        new_topic_ids: Vec<i32>,
    },
}

/// Result type for build operations.
pub type BuildResult<T> = Result<T, BuildError>;
