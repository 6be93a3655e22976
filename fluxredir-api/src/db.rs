//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres and the three
//! correspondence lookups. Every pooled connection has the store schema on
//! its `search_path`, so queries name the tables unqualified.

use async_trait::async_trait;
use deadpool_postgres::Pool;
use fluxredir_core::{env_or, LegacyId, PgConfig, PostLocation, StoreSchema, DEFAULT_STORE_SCHEMA};

use crate::error::{ApiError, ApiResult};
use crate::store::MappingStore;

const TOPIC_BY_LEGACY_TOPIC: &str =
    "SELECT discourse_topic_id FROM posts WHERE fluxbb_topic_id = $1 LIMIT 1";

const LOCATION_BY_LEGACY_POST: &str = "SELECT discourse_topic_id, discourse_topic_post_number \
     FROM posts WHERE fluxbb_post_id = $1 LIMIT 1";

const USERNAME_BY_LEGACY_USER: &str =
    "SELECT discourse_username FROM users WHERE fluxbb_user_id = $1 LIMIT 1";

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Correspondence store configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub pg: PgConfig,
    pub schema: StoreSchema,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            pg: PgConfig::default(),
            schema: StoreSchema::default(),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from `FLUXREDIR_DB_*` and
    /// `FLUXREDIR_DB_SCHEMA`.
    pub fn from_env() -> ApiResult<Self> {
        let pg = PgConfig::from_env_prefixed("FLUXREDIR_DB")?;
        let schema = StoreSchema::new(env_or("FLUXREDIR_DB_SCHEMA", DEFAULT_STORE_SCHEMA))?;
        Ok(Self { pg, schema })
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let pool = self
            .pg
            .clone()
            .with_search_path(self.schema.clone())
            .create_pool()?;
        Ok(pool)
    }
}

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// Database client that wraps the connection pool and answers mapping
/// lookups, one read-only transaction per lookup.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    /// Create a new database client with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new database client from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Close the pool; further lookups fail with ServiceUnavailable.
    pub fn close(&self) {
        self.pool.close();
    }

    /// Get a connection from the pool.
    pub async fn get_conn(&self) -> ApiResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// Run a single-row query inside a read-only transaction.
    async fn query_opt_readonly(
        &self,
        sql: &str,
        legacy_id: LegacyId,
    ) -> ApiResult<Option<tokio_postgres::Row>> {
        let mut conn = self.get_conn().await?;
        let client: &mut tokio_postgres::Client = &mut conn;

        let tx = client.build_transaction().read_only(true).start().await?;
        let row = tx.query_opt(sql, &[&legacy_id]).await?;
        tx.commit().await?;

        Ok(row)
    }
}

#[async_trait]
impl MappingStore for DbClient {
    async fn topic_for_legacy_topic(&self, legacy_topic_id: LegacyId) -> ApiResult<Option<i32>> {
        let row = self
            .query_opt_readonly(TOPIC_BY_LEGACY_TOPIC, legacy_topic_id)
            .await?;
        Ok(row.and_then(|r| r.get::<_, Option<i32>>(0)))
    }

    async fn location_for_legacy_post(
        &self,
        legacy_post_id: LegacyId,
    ) -> ApiResult<Option<PostLocation>> {
        let row = self
            .query_opt_readonly(LOCATION_BY_LEGACY_POST, legacy_post_id)
            .await?;

        Ok(row.and_then(|r| {
            let topic_id: Option<i32> = r.get(0);
            let post_number: Option<i32> = r.get(1);
            Some(PostLocation {
                topic_id: topic_id?,
                post_number: post_number?,
            })
        }))
    }

    async fn username_for_legacy_user(
        &self,
        legacy_user_id: LegacyId,
    ) -> ApiResult<Option<String>> {
        let row = self
            .query_opt_readonly(USERNAME_BY_LEGACY_USER, legacy_user_id)
            .await?;
        Ok(row.and_then(|r| r.get::<_, Option<String>>(0)))
    }

    async fn ping(&self) -> ApiResult<()> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[]).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_sql_uses_unqualified_tables() {
        assert!(TOPIC_BY_LEGACY_TOPIC.contains("FROM posts"));
        assert!(LOCATION_BY_LEGACY_POST.contains("fluxbb_post_id = $1"));
        assert!(USERNAME_BY_LEGACY_USER.contains("FROM users"));
    }

    #[tokio::test]
    async fn test_closed_pool_is_service_unavailable() {
        let client = DbClient::from_config(&DbConfig::default()).expect("pool config is valid");
        assert_eq!(client.pool_size(), 0);

        client.close();
        let err = client
            .topic_for_legacy_topic(77)
            .await
            .expect_err("closed pool cannot serve lookups");
        assert_eq!(err.code, crate::error::ErrorCode::ServiceUnavailable);
    }
}
