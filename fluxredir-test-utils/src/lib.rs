//! fluxredir Test Utilities
//!
//! Shared test infrastructure for the fluxredir workspace:
//! - An in-memory mapping store for router tests
//! - Proptest generators for correspondence rows
//! - Fixtures for the usual migration scenarios

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

// Re-export core types for convenience
pub use fluxredir_core::{LegacyId, PostLocation, PostMapping, UserMapping};

use fluxredir_api::{ApiError, ApiResult, MappingStore};

// ============================================================================
// MOCK STORE
// ============================================================================

/// Mapping store backed by hash maps.
///
/// Topic lookups answer with the new topic of the first post row seen for
/// that legacy topic, which matches the store's `LIMIT 1` query once the
/// builder's topic consistency check has passed.
#[derive(Debug, Default)]
pub struct InMemoryMappingStore {
    users: HashMap<LegacyId, String>,
    posts: HashMap<LegacyId, PostLocation>,
    topics: HashMap<LegacyId, i32>,
    unavailable: AtomicBool,
    lookups: AtomicUsize,
}

impl InMemoryMappingStore {
    pub fn new(users: &[UserMapping], posts: &[PostMapping]) -> Self {
        let mut store = Self::default();
        for user in users {
            store
                .users
                .insert(user.legacy_user_id, user.new_username.clone());
        }
        for post in posts {
            store.posts.insert(post.legacy_post_id, post.location());
            store
                .topics
                .entry(post.legacy_topic_id)
                .or_insert(post.new_topic_id);
        }
        store
    }

    /// Make every subsequent call fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of mapping lookups served so far (pings excluded).
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn check(&self) -> ApiResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ApiError::service_unavailable("Database connection pool closed"));
        }
        Ok(())
    }

    fn lookup(&self) -> ApiResult<()> {
        self.check()?;
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl MappingStore for InMemoryMappingStore {
    async fn topic_for_legacy_topic(&self, legacy_topic_id: LegacyId) -> ApiResult<Option<i32>> {
        self.lookup()?;
        Ok(self.topics.get(&legacy_topic_id).copied())
    }

    async fn location_for_legacy_post(
        &self,
        legacy_post_id: LegacyId,
    ) -> ApiResult<Option<PostLocation>> {
        self.lookup()?;
        Ok(self.posts.get(&legacy_post_id).copied())
    }

    async fn username_for_legacy_user(
        &self,
        legacy_user_id: LegacyId,
    ) -> ApiResult<Option<String>> {
        self.lookup()?;
        Ok(self.users.get(&legacy_user_id).cloned())
    }

    async fn ping(&self) -> ApiResult<()> {
        self.check()
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use super::*;
    use proptest::collection::{btree_map, vec};
    use proptest::prelude::*;

    /// Any usable legacy id.
    pub fn arb_legacy_id() -> impl Strategy<Value = LegacyId> {
        1..=i32::MAX
    }

    /// Usernames as Discourse allows them, plus a few that need escaping.
    pub fn arb_username() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z0-9_][a-zA-Z0-9_.-]{2,19}",
            "[a-z]{2,8} [a-z]{2,8}",
            "[a-z]{2,8}[&?#/%][a-z]{1,8}",
        ]
    }

    pub fn arb_user_mapping() -> impl Strategy<Value = UserMapping> {
        (arb_legacy_id(), arb_username()).prop_map(|(legacy_user_id, new_username)| UserMapping {
            legacy_user_id,
            new_username,
        })
    }

    /// A consistent `posts` table: every legacy post id is unique and each
    /// legacy topic maps to exactly one new topic.
    pub fn arb_post_table() -> impl Strategy<Value = Vec<PostMapping>> {
        btree_map(arb_legacy_id(), (1..=i32::MAX, 1usize..6), 0..8).prop_map(|topics| {
            let mut next_post_id: LegacyId = 1;
            let mut rows = Vec::new();
            for (legacy_topic_id, (new_topic_id, count)) in topics {
                for n in 0..count {
                    rows.push(PostMapping {
                        legacy_post_id: next_post_id,
                        legacy_topic_id,
                        new_topic_id,
                        new_topic_post_number: n as i32 + 1,
                    });
                    next_post_id += 1;
                }
            }
            rows
        })
    }

    /// A `users` table with unique legacy ids.
    pub fn arb_user_table() -> impl Strategy<Value = Vec<UserMapping>> {
        vec(arb_user_mapping(), 0..10).prop_map(|rows| {
            let mut seen = std::collections::HashSet::new();
            rows.into_iter()
                .filter(|row| seen.insert(row.legacy_user_id))
                .collect()
        })
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    use super::*;

    pub const FORUM_URL: &str = "https://forum.example.org/";
    pub const PUBLIC_HOST: &str = "old.example.org";

    /// Legacy post 501 in legacy topic 77, now post 3 of topic 9001.
    pub fn worked_example_post() -> PostMapping {
        PostMapping {
            legacy_post_id: 501,
            legacy_topic_id: 77,
            new_topic_id: 9001,
            new_topic_post_number: 3,
        }
    }

    /// The three posts of legacy topic 77.
    pub fn worked_example_topic() -> Vec<PostMapping> {
        vec![
            PostMapping {
                legacy_post_id: 499,
                legacy_topic_id: 77,
                new_topic_id: 9001,
                new_topic_post_number: 1,
            },
            PostMapping {
                legacy_post_id: 500,
                legacy_topic_id: 77,
                new_topic_id: 9001,
                new_topic_post_number: 2,
            },
            worked_example_post(),
        ]
    }

    /// Legacy user 12, now `alice`.
    pub fn worked_example_user() -> UserMapping {
        UserMapping {
            legacy_user_id: 12,
            new_username: "alice".to_string(),
        }
    }

    /// Store holding the worked example topic and user.
    pub fn worked_example_store() -> InMemoryMappingStore {
        InMemoryMappingStore::new(&[worked_example_user()], &worked_example_topic())
    }
}

// ============================================================================
// DISCOURSE FIXTURE
// ============================================================================

/// SQL for a minimal stand-in of the Discourse tables the builder joins.
///
/// Every generated statement is schema-qualified so a test can create the
/// fixture in a scratch schema and point its `search_path` there.
pub mod discourse {
    use super::*;

    /// Discourse ids start here so they never coincide with legacy ids.
    pub const DISCOURSE_ID_BASE: i32 = 100_000;

    pub fn fixture_ddl(schema: &str) -> String {
        format!(
            "DROP SCHEMA IF EXISTS {schema} CASCADE;
CREATE SCHEMA {schema};
CREATE TABLE {schema}.users (id integer primary key, username text not null);
CREATE TABLE {schema}.user_custom_fields (user_id integer not null, name text not null, value text);
CREATE TABLE {schema}.posts (id integer primary key, topic_id integer not null, post_number integer not null);
CREATE TABLE {schema}.post_custom_fields (post_id integer not null, name text not null, value text);"
        )
    }

    fn quote(value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Imported users and posts, each carrying its legacy id as `import_id`.
    pub fn fixture_rows(schema: &str, users: &[UserMapping], posts: &[PostMapping]) -> String {
        let mut sql = String::new();

        for (i, user) in users.iter().enumerate() {
            let id = DISCOURSE_ID_BASE + i as i32;
            sql.push_str(&format!(
                "INSERT INTO {schema}.users (id, username) VALUES ({id}, {});\n",
                quote(&user.new_username)
            ));
            sql.push_str(&format!(
                "INSERT INTO {schema}.user_custom_fields (user_id, name, value) VALUES ({id}, 'import_id', '{}');\n",
                user.legacy_user_id
            ));
        }

        for (i, post) in posts.iter().enumerate() {
            let id = DISCOURSE_ID_BASE + i as i32;
            sql.push_str(&format!(
                "INSERT INTO {schema}.posts (id, topic_id, post_number) VALUES ({id}, {}, {});\n",
                post.new_topic_id, post.new_topic_post_number
            ));
            sql.push_str(&format!(
                "INSERT INTO {schema}.post_custom_fields (post_id, name, value) VALUES ({id}, 'import_id', '{}');\n",
                post.legacy_post_id
            ));
        }

        sql
    }

    pub fn drop_schema(schema: &str) -> String {
        format!("DROP SCHEMA IF EXISTS {schema} CASCADE")
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[tokio::test]
    async fn test_worked_example_store() -> ApiResult<()> {
        let store = worked_example_store();
        assert_eq!(store.topic_for_legacy_topic(77).await?, Some(9001));
        assert_eq!(
            store.location_for_legacy_post(501).await?,
            Some(PostLocation {
                topic_id: 9001,
                post_number: 3
            })
        );
        assert_eq!(
            store.username_for_legacy_user(12).await?,
            Some("alice".to_string())
        );
        assert_eq!(store.topic_for_legacy_topic(78).await?, None);
        assert_eq!(store.lookup_count(), 4);
        Ok(())
    }

    #[test]
    fn test_fixture_rows_carry_import_ids() {
        let sql = discourse::fixture_rows(
            "fx",
            &[UserMapping {
                legacy_user_id: 12,
                new_username: "o'brien".to_string(),
            }],
            &[worked_example_post()],
        );
        assert!(sql.contains("VALUES (100000, 'o''brien')"));
        assert!(sql.contains("INSERT INTO fx.post_custom_fields (post_id, name, value) VALUES (100000, 'import_id', '501')"));
        assert!(sql.contains("VALUES (100000, 9001, 3)"));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = worked_example_store();
        store.set_unavailable(true);
        assert!(store.ping().await.is_err());
        assert!(store.location_for_legacy_post(501).await.is_err());
        assert_eq!(store.lookup_count(), 0);
    }
}
