//! fluxredir Core - Correspondence Types
//!
//! Data types shared by the correspondence builder and the redirect
//! resolver: the two mapping rows, the correspondence-store schema, the
//! PostgreSQL connection settings both sides use, and the parsing rule for
//! legacy identifiers arriving as query parameters.

pub mod config;
pub mod entities;
pub mod error;
pub mod identity;
pub mod schema;

pub use config::{env_flag, env_or, env_parse, env_required, PgConfig};
pub use entities::{PostLocation, PostMapping, UserMapping};
pub use error::{ConfigError, CoreError, CoreResult};
pub use identity::{parse_legacy_id, LegacyId};
pub use schema::{validate_identifier, StoreSchema, DEFAULT_STORE_SCHEMA};
