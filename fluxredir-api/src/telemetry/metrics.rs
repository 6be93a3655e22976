//! Prometheus Metrics Definitions
//!
//! Request counters, redirect outcomes and lookup latency. Exposed on
//! `/metrics` for Prometheus scraping.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Mapping lookup latency buckets (seconds)
const LOOKUP_LATENCY_BUCKETS: &[f64] =
    &[0.0005, 0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0];

/// Global metrics instance - initialized once at startup
pub static METRICS: Lazy<ApiResult<RedirectMetrics>> = Lazy::new(RedirectMetrics::new);

/// Container for all resolver metrics.
#[derive(Clone)]
pub struct RedirectMetrics {
    /// HTTP request counter - labels: method, route, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, route
    pub http_request_duration_seconds: HistogramVec,

    /// Redirect outcomes - labels: kind (topic, post, user, root, passthrough), outcome
    pub redirects_total: CounterVec,

    /// Mapping lookup duration histogram - labels: kind
    pub lookup_duration_seconds: HistogramVec,
}

impl RedirectMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "fluxredir_http_requests_total",
                "Total number of HTTP requests",
                &["method", "route", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_requests_total: {}", e)))?,

            http_request_duration_seconds: register_histogram_vec!(
                "fluxredir_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "route"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_request_duration_seconds: {}", e)))?,

            redirects_total: register_counter_vec!(
                "fluxredir_redirects_total",
                "Total redirect resolutions by kind and outcome",
                &["kind", "outcome"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register redirects_total: {}", e)))?,

            lookup_duration_seconds: register_histogram_vec!(
                "fluxredir_lookup_duration_seconds",
                "Correspondence lookup duration in seconds",
                &["kind"],
                LOOKUP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register lookup_duration_seconds: {}", e)))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, route: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, route, &status_str])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, route])
            .observe(duration_secs);
    }

    /// Record the outcome of one redirect resolution.
    pub fn record_redirect(&self, kind: &str, outcome: &str) {
        self.redirects_total.with_label_values(&[kind, outcome]).inc();
    }

    /// Record how long a correspondence lookup took.
    pub fn record_lookup(&self, kind: &str, duration_secs: f64) {
        self.lookup_duration_seconds
            .with_label_values(&[kind])
            .observe(duration_secs);
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_redirect() -> Result<(), String> {
        let metrics = METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))?;

        let before = metrics
            .redirects_total
            .with_label_values(&["post", "found"])
            .get();
        metrics.record_redirect("post", "found");
        let after = metrics
            .redirects_total
            .with_label_values(&["post", "found"])
            .get();
        assert!(after >= before + 1.0);
        Ok(())
    }

    #[test]
    fn test_record_http_request() -> Result<(), String> {
        let metrics = METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))?;
        metrics.record_http_request("GET", "/viewtopic.php", 302, 0.002);
        metrics.record_lookup("topic", 0.001);

        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buffer)
            .map_err(|e| e.to_string())?;
        let text = String::from_utf8(buffer).map_err(|e| e.to_string())?;
        assert!(text.contains("fluxredir_http_requests_total"));
        assert!(text.contains("fluxredir_lookup_duration_seconds"));
        Ok(())
    }
}
