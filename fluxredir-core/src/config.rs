//! PostgreSQL connection settings shared by the builder and the resolver.
//!
//! Both binaries are configured entirely from environment variables. The
//! resolver reads `FLUXREDIR_DB_*`, the builder reads `FLUXREDIR_DISCOURSE_*`
//! for the same kind of connection.

use std::str::FromStr;
use std::time::Duration;

use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;

use crate::error::{ConfigError, CoreResult};
use crate::schema::StoreSchema;

/// Read an environment variable, falling back to `default` when unset.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read a required environment variable.
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingRequired {
        field: key.to_string(),
    })
}

/// Read and parse an environment variable, falling back to `default` when
/// unset. A set but unparsable value is an error rather than a silent default.
pub fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            field: key.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Read a boolean flag ("true"/"1"/"yes" are true, anything else false).
pub fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|s| matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

/// PostgreSQL connection pool configuration.
#[derive(Debug, Clone)]
pub struct PgConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// How long a caller waits for a pooled connection
    pub timeout: Duration,
    /// Schema put first on every connection's `search_path`
    pub search_path: Option<StoreSchema>,
}

impl Default for PgConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "discourse".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            max_size: 16,
            timeout: Duration::from_secs(30),
            search_path: None,
        }
    }
}

impl PgConfig {
    /// Create a configuration from `<PREFIX>_HOST`, `<PREFIX>_PORT`,
    /// `<PREFIX>_NAME`, `<PREFIX>_USER`, `<PREFIX>_PASSWORD`,
    /// `<PREFIX>_POOL_SIZE` and `<PREFIX>_TIMEOUT` (seconds).
    pub fn from_env_prefixed(prefix: &str) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |suffix: &str| format!("{}_{}", prefix, suffix);

        Ok(Self {
            host: env_or(&var("HOST"), &defaults.host),
            port: env_parse(&var("PORT"), defaults.port)?,
            dbname: env_or(&var("NAME"), &defaults.dbname),
            user: env_or(&var("USER"), &defaults.user),
            password: env_or(&var("PASSWORD"), ""),
            max_size: env_parse(&var("POOL_SIZE"), defaults.max_size)?,
            timeout: Duration::from_secs(env_parse(&var("TIMEOUT"), 30u64)?),
            search_path: None,
        })
    }

    /// Put `schema` first on the search path of every pooled connection.
    pub fn with_search_path(mut self, schema: StoreSchema) -> Self {
        self.search_path = Some(schema);
        self
    }

    /// Create a connection pool from this configuration.
    ///
    /// The pool opens no connections up front; they are created on first
    /// use and grow up to `max_size`.
    pub fn create_pool(&self) -> CoreResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());
        cfg.options = self
            .search_path
            .as_ref()
            .map(|schema| format!("-c search_path={}", schema.name()));

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = PoolConfig::new(self.max_size);
        pool_cfg.timeouts.wait = Some(self.timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PgConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.max_size, 16);
        assert!(config.search_path.is_none());
    }

    #[test]
    fn test_from_env_prefixed_reads_prefix() {
        std::env::set_var("FLUXREDIR_CFGTEST_HOST", "db.internal");
        std::env::set_var("FLUXREDIR_CFGTEST_PORT", "6543");
        std::env::set_var("FLUXREDIR_CFGTEST_NAME", "forum");

        let config = PgConfig::from_env_prefixed("FLUXREDIR_CFGTEST").expect("valid env");
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 6543);
        assert_eq!(config.dbname, "forum");
        assert_eq!(config.user, "postgres");

        std::env::remove_var("FLUXREDIR_CFGTEST_HOST");
        std::env::remove_var("FLUXREDIR_CFGTEST_PORT");
        std::env::remove_var("FLUXREDIR_CFGTEST_NAME");
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        std::env::set_var("FLUXREDIR_BADPORT_PORT", "not-a-port");
        let err = PgConfig::from_env_prefixed("FLUXREDIR_BADPORT").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "FLUXREDIR_BADPORT_PORT"));
        std::env::remove_var("FLUXREDIR_BADPORT_PORT");
    }

    #[test]
    fn test_env_required_missing() {
        let err = env_required("FLUXREDIR_SURELY_UNSET_VARIABLE").unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingRequired {
                field: "FLUXREDIR_SURELY_UNSET_VARIABLE".to_string()
            }
        );
    }

    #[test]
    fn test_env_flag() {
        std::env::set_var("FLUXREDIR_FLAG_ON", "TRUE");
        std::env::set_var("FLUXREDIR_FLAG_OFF", "no");
        assert!(env_flag("FLUXREDIR_FLAG_ON", false));
        assert!(!env_flag("FLUXREDIR_FLAG_OFF", true));
        assert!(env_flag("FLUXREDIR_FLAG_UNSET", true));
        std::env::remove_var("FLUXREDIR_FLAG_ON");
        std::env::remove_var("FLUXREDIR_FLAG_OFF");
    }

    #[test]
    fn test_create_pool_is_lazy() {
        // No server is needed: the pool does not connect until first use.
        let config = PgConfig::default().with_search_path(StoreSchema::default());
        let pool = config.create_pool().expect("pool config is valid");
        assert_eq!(pool.status().size, 0);
    }
}
