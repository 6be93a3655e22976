//! Correspondence build: schema, user mapping, post staging and join.
//!
//! Everything after the legacy fetch runs inside one PostgreSQL
//! transaction. The resolver either sees the previous tables or the
//! complete new ones.

use std::time::{Duration, Instant};

use fluxredir_core::{LegacyId, StoreSchema};
use tokio_postgres::{Client, Transaction};

use crate::config::BuildOptions;
use crate::error::{BuildError, BuildResult};
use crate::legacy::{ensure_unique_posts, LegacyPost, LegacySource};

/// Name of the per-transaction staging table holding legacy posts.
pub const STAGING_TABLE: &str = "fluxbb_data";

/// How many missing legacy post ids an unmatched-post error lists.
const UNMATCHED_SAMPLE: i64 = 10;

/// Counts from one completed build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildReport {
    pub users_mapped: u64,
    pub posts_staged: u64,
    pub posts_mapped: u64,
    pub elapsed: Duration,
}

impl BuildReport {
    pub fn posts_unmatched(&self) -> u64 {
        self.posts_staged.saturating_sub(self.posts_mapped)
    }
}

/// Builds the correspondence tables in `schema` from the Discourse tables
/// visible on the connection's search path.
#[derive(Debug, Clone)]
pub struct CorrespondenceBuilder {
    schema: StoreSchema,
    options: BuildOptions,
}

impl CorrespondenceBuilder {
    pub fn new(schema: StoreSchema, options: BuildOptions) -> Self {
        Self { schema, options }
    }

    // ------------------------------------------------------------------------
    // SQL
    // ------------------------------------------------------------------------

    pub fn user_mapping_sql(&self) -> String {
        format!(
            "INSERT INTO {users} (fluxbb_user_id, discourse_username)
SELECT value::integer AS fluxbb_user_id, username AS discourse_username
FROM user_custom_fields
    JOIN users ON users.id = user_custom_fields.user_id
WHERE user_custom_fields.name = 'import_id'",
            users = self.schema.users_table()
        )
    }

    pub fn staging_ddl() -> String {
        format!(
            "CREATE TEMP TABLE {STAGING_TABLE} (
    fluxbb_post_id integer primary key,
    fluxbb_topic_id integer not null
) ON COMMIT DROP"
        )
    }

    pub fn staging_insert_sql() -> String {
        format!(
            "INSERT INTO {STAGING_TABLE} (fluxbb_post_id, fluxbb_topic_id)
SELECT * FROM UNNEST($1::integer[], $2::integer[])"
        )
    }

    pub fn post_mapping_sql(&self) -> String {
        format!(
            "WITH import_info AS (
    SELECT value::integer AS fluxbb_post_id, post_id
    FROM post_custom_fields
    WHERE name = 'import_id'
)
INSERT INTO {posts}
    (fluxbb_post_id, fluxbb_topic_id, discourse_topic_id, discourse_topic_post_number)
SELECT
    fluxbb_post_id, fluxbb_topic_id,
    posts.topic_id AS discourse_topic_id,
    posts.post_number AS discourse_topic_post_number
FROM {STAGING_TABLE}
    JOIN import_info USING (fluxbb_post_id)
    JOIN posts ON import_info.post_id = posts.id",
            posts = self.schema.posts_table()
        )
    }

    pub fn unmatched_sample_sql(&self) -> String {
        format!(
            "SELECT s.fluxbb_post_id FROM {STAGING_TABLE} s
WHERE NOT EXISTS (
    SELECT 1 FROM {posts} p WHERE p.fluxbb_post_id = s.fluxbb_post_id
)
ORDER BY s.fluxbb_post_id
LIMIT $1",
            posts = self.schema.posts_table()
        )
    }

    pub fn topic_split_sql(&self) -> String {
        format!(
            "SELECT fluxbb_topic_id,
    array_agg(DISTINCT discourse_topic_id ORDER BY discourse_topic_id) AS discourse_topic_ids
FROM {posts}
WHERE discourse_topic_id IS NOT NULL
GROUP BY fluxbb_topic_id
HAVING COUNT(DISTINCT discourse_topic_id) > 1
ORDER BY fluxbb_topic_id
LIMIT 1",
            posts = self.schema.posts_table()
        )
    }

    // ------------------------------------------------------------------------
    // STEPS
    // ------------------------------------------------------------------------

    /// Create the store schema and tables if they do not exist.
    pub async fn ensure_schema(&self, tx: &Transaction<'_>) -> BuildResult<()> {
        tx.batch_execute(&self.schema.create_ddl()).await?;
        Ok(())
    }

    /// Empty both correspondence tables.
    pub async fn reset(&self, tx: &Transaction<'_>) -> BuildResult<()> {
        tx.batch_execute(&self.schema.truncate_sql()).await?;
        tracing::info!(schema = %self.schema.name(), "Cleared correspondence tables");
        Ok(())
    }

    /// Insert one user row per imported Discourse user.
    ///
    /// A legacy user imported twice violates the unique constraint and
    /// fails the build.
    pub async fn build_user_mapping(&self, tx: &Transaction<'_>) -> BuildResult<u64> {
        let rows = tx.execute(self.user_mapping_sql().as_str(), &[]).await?;
        tracing::info!(users = rows, "Mapped legacy users");
        Ok(rows)
    }

    /// Copy legacy post/topic pairs into the staging table.
    pub async fn stage_legacy_posts(
        &self,
        tx: &Transaction<'_>,
        posts: &[LegacyPost],
    ) -> BuildResult<u64> {
        tx.batch_execute(&Self::staging_ddl()).await?;

        let post_ids: Vec<LegacyId> = posts.iter().map(|p| p.post_id).collect();
        let topic_ids: Vec<LegacyId> = posts.iter().map(|p| p.topic_id).collect();
        let rows = tx
            .execute(Self::staging_insert_sql().as_str(), &[&post_ids, &topic_ids])
            .await?;

        tracing::info!(posts = rows, "Staged legacy posts");
        Ok(rows)
    }

    /// Join staged posts with Discourse's import ids and insert the mapping.
    pub async fn join_insert_post_mapping(&self, tx: &Transaction<'_>) -> BuildResult<u64> {
        let rows = tx.execute(self.post_mapping_sql().as_str(), &[]).await?;
        tracing::info!(posts = rows, "Mapped legacy posts");
        Ok(rows)
    }

    /// Fail when staged posts found no imported Discourse post, unless
    /// unmatched posts are allowed.
    pub async fn check_unmatched(
        &self,
        tx: &Transaction<'_>,
        staged: u64,
        mapped: u64,
    ) -> BuildResult<()> {
        if mapped >= staged {
            return Ok(());
        }

        let missing = staged - mapped;
        let sample: Vec<LegacyId> = tx
            .query(self.unmatched_sample_sql().as_str(), &[&UNMATCHED_SAMPLE])
            .await?
            .iter()
            .map(|row| row.get(0))
            .collect();

        if self.options.allow_unmatched {
            tracing::warn!(staged, missing, ?sample, "Legacy posts without imported counterpart");
            return Ok(());
        }

        Err(BuildError::UnmatchedPosts {
            staged,
            missing,
            sample,
        })
    }

    /// Fail when the posts of one legacy topic landed in several Discourse
    /// topics, which would make topic redirects depend on row order.
    pub async fn check_topic_consistency(&self, tx: &Transaction<'_>) -> BuildResult<()> {
        match tx.query_opt(self.topic_split_sql().as_str(), &[]).await? {
            Some(row) => Err(BuildError::TopicSplit {
                legacy_topic_id: row.get(0),
                new_topic_ids: row.get(1),
            }),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------------
    // RUN
    // ------------------------------------------------------------------------

    /// Run a complete build: fetch legacy posts, then create, fill and check
    /// both tables in one transaction.
    pub async fn run(
        &self,
        client: &mut Client,
        source: &dyn LegacySource,
    ) -> BuildResult<BuildReport> {
        let start = Instant::now();

        let posts = source.fetch_posts().await?;
        ensure_unique_posts(&posts)?;
        tracing::info!(posts = posts.len(), "Read legacy posts");

        let tx = client.transaction().await?;

        self.ensure_schema(&tx).await?;
        if self.options.reset {
            self.reset(&tx).await?;
        }

        let users_mapped = self.build_user_mapping(&tx).await?;
        let posts_staged = self.stage_legacy_posts(&tx, &posts).await?;
        let posts_mapped = self.join_insert_post_mapping(&tx).await?;

        self.check_unmatched(&tx, posts_staged, posts_mapped).await?;
        self.check_topic_consistency(&tx).await?;

        tx.commit().await?;

        let report = BuildReport {
            users_mapped,
            posts_staged,
            posts_mapped,
            elapsed: start.elapsed(),
        };
        tracing::info!(
            users = report.users_mapped,
            staged = report.posts_staged,
            mapped = report.posts_mapped,
            unmatched = report.posts_unmatched(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Correspondence build committed"
        );
        Ok(report)
    }
}
