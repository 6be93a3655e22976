//! Builder Configuration Module
//!
//! Connection settings for the legacy FluxBB database (MySQL) and the
//! Discourse database (PostgreSQL), plus the run options.

use fluxredir_core::{
    env_flag, env_or, env_parse, env_required, ConfigError, PgConfig, StoreSchema,
    DEFAULT_STORE_SCHEMA,
};
use sqlx::mysql::MySqlConnectOptions;

use crate::error::BuildResult;
use crate::legacy::validate_table_prefix;

/// Legacy FluxBB database settings.
#[derive(Debug, Clone)]
pub struct LegacyConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// FluxBB table prefix, possibly empty.
    pub prefix: String,
}

impl LegacyConfig {
    /// Load from `FLUXREDIR_FLUXBB_*`.
    ///
    /// `HOST`, `USER`, `PASSWORD` and `DB` are required; `PORT` defaults to
    /// 3306 and `PREFIX` to the empty string.
    pub fn from_env() -> BuildResult<Self> {
        let config = Self {
            host: env_required("FLUXREDIR_FLUXBB_HOST")?,
            port: env_parse("FLUXREDIR_FLUXBB_PORT", 3306)?,
            user: env_required("FLUXREDIR_FLUXBB_USER")?,
            password: env_required("FLUXREDIR_FLUXBB_PASSWORD")?,
            database: env_required("FLUXREDIR_FLUXBB_DB")?,
            prefix: env_or("FLUXREDIR_FLUXBB_PREFIX", ""),
        };
        validate_table_prefix(&config.prefix)?;
        Ok(config)
    }

    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .charset("utf8mb4")
    }
}

/// Options changing how a build treats existing or incomplete data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Empty both correspondence tables before inserting.
    pub reset: bool,
    /// Log, rather than fail on, legacy posts with no imported counterpart.
    pub allow_unmatched: bool,
}

impl BuildOptions {
    /// Load from `FLUXREDIR_BUILD_RESET` and `FLUXREDIR_ALLOW_UNMATCHED`.
    pub fn from_env() -> Self {
        Self {
            reset: env_flag("FLUXREDIR_BUILD_RESET", false),
            allow_unmatched: env_flag("FLUXREDIR_ALLOW_UNMATCHED", false),
        }
    }
}

/// Complete builder configuration.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    pub legacy: LegacyConfig,
    pub discourse: PgConfig,
    pub schema: StoreSchema,
    pub options: BuildOptions,
}

impl BuilderConfig {
    pub fn from_env() -> BuildResult<Self> {
        let mut discourse = PgConfig::from_env_prefixed("FLUXREDIR_DISCOURSE")?;
        // One sequential run needs one connection.
        discourse.max_size = 1;

        Ok(Self {
            legacy: LegacyConfig::from_env()?,
            discourse,
            schema: StoreSchema::new(env_or("FLUXREDIR_DB_SCHEMA", DEFAULT_STORE_SCHEMA))?,
            options: BuildOptions::from_env(),
        })
    }
}

/// Log level from `FLUXREDIR_LOG_LEVEL`, checked against the accepted names.
pub fn log_level_from_env() -> Result<String, ConfigError> {
    let level = env_or("FLUXREDIR_LOG_LEVEL", "info").to_lowercase();
    match level.as_str() {
        "debug" | "info" | "warn" | "error" => Ok(level),
        _ => Err(ConfigError::InvalidValue {
            field: "FLUXREDIR_LOG_LEVEL".to_string(),
            value: level.clone(),
            reason: "expected one of debug, info, warn, error".to_string(),
        }),
    }
}
