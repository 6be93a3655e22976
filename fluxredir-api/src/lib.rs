//! fluxredir API - FluxBB permalink resolver
//!
//! Answers requests for old FluxBB URLs (`viewtopic.php`, `profile.php`, and
//! anything else) with a 302 to the matching Discourse page. Every redirect
//! carries a `redirected_from` parameter holding the URL the client asked for.
//!
//! Lookups go through the [`MappingStore`] trait; [`DbClient`] is the pooled
//! PostgreSQL implementation reading the tables the builder produced.

pub mod config;
pub mod db;
pub mod error;
pub mod redirect;
pub mod routes;
pub mod state;
pub mod store;
pub mod telemetry;

// Re-export commonly used types
pub use config::{normalize_forum_url, ApiConfig};
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use redirect::{found, original_url, with_provenance, ForumBase, PROVENANCE_PARAM};
pub use routes::create_router;
pub use state::AppState;
pub use store::MappingStore;
