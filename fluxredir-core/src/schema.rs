//! Correspondence store schema.
//!
//! The store lives in its own PostgreSQL schema (by default `fluxbbredir`)
//! next to the Discourse tables, so the builder can join staged legacy rows
//! against Discourse in a single statement.

use crate::error::{CoreError, CoreResult};

/// Schema name used when none is configured.
pub const DEFAULT_STORE_SCHEMA: &str = "fluxbbredir";

/// Check that `value` is a plain SQL identifier: ASCII letters, digits and
/// underscores, not starting with a digit.
///
/// Schema names and legacy table prefixes are interpolated into SQL text,
/// so nothing else is accepted.
pub fn validate_identifier(kind: &'static str, value: &str) -> CoreResult<()> {
    let mut chars = value.chars();
    let valid_first = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if valid_first && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(CoreError::InvalidIdentifier {
            kind,
            value: value.to_string(),
        })
    }
}

/// A validated correspondence-store schema name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSchema {
    name: String,
}

impl Default for StoreSchema {
    fn default() -> Self {
        Self {
            name: DEFAULT_STORE_SCHEMA.to_string(),
        }
    }
}

impl StoreSchema {
    pub fn new(name: impl Into<String>) -> CoreResult<Self> {
        let name = name.into();
        validate_identifier("store schema", &name)?;
        Ok(Self { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully qualified name of the user mapping table.
    pub fn users_table(&self) -> String {
        format!("{}.users", self.name)
    }

    /// Fully qualified name of the post mapping table.
    pub fn posts_table(&self) -> String {
        format!("{}.posts", self.name)
    }

    /// DDL creating the schema and both correspondence tables.
    ///
    /// Every statement is `IF NOT EXISTS`, so running it against an existing
    /// store changes nothing.
    pub fn create_ddl(&self) -> String {
        let schema = &self.name;
        format!(
            "CREATE SCHEMA IF NOT EXISTS {schema};
CREATE TABLE IF NOT EXISTS {schema}.users (
    fluxbb_user_id integer unique,
    discourse_username text
);
CREATE TABLE IF NOT EXISTS {schema}.posts (
    fluxbb_post_id integer primary key,
    fluxbb_topic_id integer not null,
    discourse_topic_id integer,
    discourse_topic_post_number integer
);
CREATE INDEX IF NOT EXISTS posts_fluxbb_topic_id_idx ON {schema}.posts (fluxbb_topic_id);"
        )
    }

    /// Statement emptying both correspondence tables.
    pub fn truncate_sql(&self) -> String {
        format!("TRUNCATE {}, {}", self.users_table(), self.posts_table())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("schema", "fluxbbredir").is_ok());
        assert!(validate_identifier("schema", "_private").is_ok());
        assert!(validate_identifier("schema", "flux_2024").is_ok());

        assert!(validate_identifier("schema", "").is_err());
        assert!(validate_identifier("schema", "2fast").is_err());
        assert!(validate_identifier("schema", "a;drop table users").is_err());
        assert!(validate_identifier("schema", "with space").is_err());
        assert!(validate_identifier("schema", "quoted\"name").is_err());
    }

    #[test]
    fn test_default_schema_tables() {
        let schema = StoreSchema::default();
        assert_eq!(schema.name(), "fluxbbredir");
        assert_eq!(schema.users_table(), "fluxbbredir.users");
        assert_eq!(schema.posts_table(), "fluxbbredir.posts");
    }

    #[test]
    fn test_create_ddl_mentions_both_tables() {
        let ddl = StoreSchema::new("redir").expect("valid schema").create_ddl();
        assert!(ddl.contains("CREATE SCHEMA IF NOT EXISTS redir"));
        assert!(ddl.contains("redir.users"));
        assert!(ddl.contains("fluxbb_post_id integer primary key"));
        assert!(ddl.contains("fluxbb_user_id integer unique"));
    }

    #[test]
    fn test_rejects_bad_schema() {
        let err = StoreSchema::new("bad-name").unwrap_err();
        assert!(err.to_string().contains("bad-name"));
    }
}
