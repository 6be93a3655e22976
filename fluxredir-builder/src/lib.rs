//! fluxredir Builder - correspondence tables for the permalink resolver
//!
//! Reads every post/topic pair from the legacy FluxBB database, matches it
//! against the `import_id` custom fields the Discourse importer left behind,
//! and writes the `users` and `posts` correspondence tables the resolver
//! reads.

pub mod config;
pub mod correspondence;
pub mod error;
pub mod legacy;

pub use config::{log_level_from_env, BuildOptions, BuilderConfig, LegacyConfig};
pub use correspondence::{BuildReport, CorrespondenceBuilder, STAGING_TABLE};
pub use error::{BuildError, BuildResult};
pub use legacy::{
    ensure_unique_posts, validate_table_prefix, LegacyPost, LegacySource, MySqlLegacySource,
    StaticLegacySource,
};
