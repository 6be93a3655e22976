//! Tracing subscriber initialization.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ApiError, ApiResult};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Default verbosity when `RUST_LOG` is not set
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: true,
        }
    }
}

impl TelemetryConfig {
    /// Read `FLUXREDIR_LOG_LEVEL` (debug, info, warn, error) and
    /// `FLUXREDIR_LOG_JSON` (default true).
    pub fn from_env() -> ApiResult<Self> {
        let log_level = std::env::var("FLUXREDIR_LOG_LEVEL")
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_else(|_| "info".to_string());
        if !LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(ApiError::invalid_input(format!(
                "Invalid FLUXREDIR_LOG_LEVEL {:?}, expected one of {:?}",
                log_level, LOG_LEVELS
            )));
        }

        Ok(Self {
            log_level,
            json: fluxredir_core::env_flag("FLUXREDIR_LOG_JSON", true),
        })
    }

    /// Filter directives used when `RUST_LOG` is absent.
    pub fn default_directives(&self) -> String {
        format!(
            "fluxredir_api={level},fluxredir_core={level},warn",
            level = self.log_level
        )
    }
}

/// Install the global tracing subscriber.
///
/// Call once at startup, before any tracing occurs.
pub fn init_tracing(config: &TelemetryConfig) -> ApiResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directives()));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if config.json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    result.map_err(|e| ApiError::internal_error(format!("Failed to init subscriber: {}", e)))?;

    tracing::info!(
        log_level = %config.log_level,
        json = config.json,
        "Telemetry initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        let config = TelemetryConfig {
            log_level: "debug".to_string(),
            json: false,
        };
        assert_eq!(
            config.default_directives(),
            "fluxredir_api=debug,fluxredir_core=debug,warn"
        );
    }

    #[test]
    fn test_telemetry_config_default() {
        let config = TelemetryConfig::default();
        assert_eq!(config.log_level, "info");
        assert!(config.json);
    }
}
