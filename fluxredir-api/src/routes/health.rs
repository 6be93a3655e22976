//! Health Check Endpoints
//!
//! - /health/ping - Simple liveness check
//! - /health/live - Process alive check
//! - /health/ready - Correspondence store connectivity check

use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;

/// Whether the correspondence store answered the readiness query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Reachable,
    Unreachable,
}

/// Body of `/health/ready`.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessReport {
    pub store: StoreStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub version: &'static str,
    pub uptime_seconds: u64,
}

impl ReadinessReport {
    fn from_ping(ping: ApiResult<()>, latency: Duration, uptime: Duration) -> Self {
        let (store, store_latency_ms, error) = match ping {
            Ok(()) => (StoreStatus::Reachable, Some(latency.as_millis() as u64), None),
            Err(e) => (StoreStatus::Unreachable, None, Some(e.message)),
        };
        Self {
            store,
            store_latency_ms,
            error,
            version: env!("CARGO_PKG_VERSION"),
            uptime_seconds: uptime.as_secs(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.store {
            StoreStatus::Reachable => StatusCode::OK,
            StoreStatus::Unreachable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// GET /health/ping
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}

/// GET /health/live
pub async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "alive")
}

/// GET /health/ready - 503 while the store is unreachable.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let start = std::time::Instant::now();
    let ping = state.store.ping().await;
    if let Err(e) = &ping {
        tracing::warn!(error = %e.message, "Correspondence store unreachable");
    }

    let report = ReadinessReport::from_ping(ping, start.elapsed(), state.start_time.elapsed());
    (report.status_code(), Json(report))
}

/// Health check routes, nested under `/health`.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ErrorCode};

    #[test]
    fn test_reachable_store_is_ready() -> Result<(), serde_json::Error> {
        let report = ReadinessReport::from_ping(
            Ok(()),
            Duration::from_millis(4),
            Duration::from_secs(90),
        );
        assert_eq!(report.status_code(), StatusCode::OK);

        let json = serde_json::to_value(&report)?;
        assert_eq!(json["store"], "reachable");
        assert_eq!(json["store_latency_ms"], 4);
        assert_eq!(json["uptime_seconds"], 90);
        assert!(json.get("error").is_none());
        Ok(())
    }

    #[test]
    fn test_unreachable_store_reports_error() -> Result<(), serde_json::Error> {
        let report = ReadinessReport::from_ping(
            Err(ApiError::new(ErrorCode::ServiceUnavailable, "pool timed out")),
            Duration::from_millis(30),
            Duration::ZERO,
        );
        assert_eq!(report.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let json = serde_json::to_value(&report)?;
        assert_eq!(json["store"], "unreachable");
        assert_eq!(json["error"], "pool timed out");
        assert!(json.get("store_latency_ms").is_none());
        Ok(())
    }
}
