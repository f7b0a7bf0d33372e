//! Prometheus metrics for the Movebank pipeline.
//!
//! Recording functions are grouped by phase. Without an installed recorder
//! (tests, one-shot CLI commands) they are no-ops.

use std::fmt;
use std::sync::OnceLock;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Upstream client
    ClientRequestsSuccess,
    ClientRequestsError,
    ClientRequestDuration,
    ClientPayloadBytes,
    ClientLicenseHandshakes,
    ClientLicenseUnresolved,

    // CSV normalizer
    ParserParseError,
    ParserRecordsNormalized,

    // Serving boundary
    ServerRequests,
    ServerFailures,
    PresentationMarkersSkipped,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::ClientRequestsSuccess => "movebank_client_requests_success_total",
            MetricName::ClientRequestsError => "movebank_client_requests_error_total",
            MetricName::ClientRequestDuration => "movebank_client_request_duration_seconds",
            MetricName::ClientPayloadBytes => "movebank_client_payload_bytes",
            MetricName::ClientLicenseHandshakes => "movebank_client_license_handshakes_total",
            MetricName::ClientLicenseUnresolved => "movebank_client_license_unresolved_total",
            MetricName::ParserParseError => "movebank_parser_parse_error_total",
            MetricName::ParserRecordsNormalized => "movebank_parser_records_normalized_total",
            MetricName::ServerRequests => "movebank_server_requests_total",
            MetricName::ServerFailures => "movebank_server_failures_total",
            MetricName::PresentationMarkersSkipped => "movebank_presentation_markers_skipped_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static METRICS_HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Calling it twice is an error from the
/// exporter; callers in tests should not call it at all.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    METRICS_HANDLE.set(handle).ok();
    info!("Metrics system initialized");
    Ok(())
}

/// Current metrics in Prometheus text format, if a recorder is installed.
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

pub mod client {
    use super::MetricName;

    pub fn request_success(entity_type: &str) {
        ::metrics::counter!(MetricName::ClientRequestsSuccess.as_str(), "entity_type" => entity_type.to_string())
            .increment(1);
    }

    pub fn request_error(entity_type: &str) {
        ::metrics::counter!(MetricName::ClientRequestsError.as_str(), "entity_type" => entity_type.to_string())
            .increment(1);
    }

    pub fn request_duration(secs: f64) {
        ::metrics::histogram!(MetricName::ClientRequestDuration.as_str()).record(secs);
    }

    pub fn payload_bytes(bytes: usize) {
        ::metrics::histogram!(MetricName::ClientPayloadBytes.as_str()).record(bytes as f64);
    }

    pub fn license_handshake(entity_type: &str) {
        ::metrics::counter!(MetricName::ClientLicenseHandshakes.as_str(), "entity_type" => entity_type.to_string())
            .increment(1);
    }

    pub fn license_unresolved(entity_type: &str) {
        ::metrics::counter!(MetricName::ClientLicenseUnresolved.as_str(), "entity_type" => entity_type.to_string())
            .increment(1);
    }
}

pub mod parser {
    use super::MetricName;

    pub fn parse_error() {
        ::metrics::counter!(MetricName::ParserParseError.as_str()).increment(1);
    }

    pub fn records_normalized(count: usize) {
        ::metrics::counter!(MetricName::ParserRecordsNormalized.as_str()).increment(count as u64);
    }
}

pub mod server {
    use super::MetricName;

    pub fn request(route: &'static str) {
        ::metrics::counter!(MetricName::ServerRequests.as_str(), "route" => route).increment(1);
    }

    pub fn failure(route: &'static str, error_kind: &'static str) {
        ::metrics::counter!(
            MetricName::ServerFailures.as_str(),
            "route" => route,
            "error_kind" => error_kind
        )
        .increment(1);
    }
}

pub mod presentation {
    use super::MetricName;

    pub fn markers_skipped(count: usize) {
        ::metrics::counter!(MetricName::PresentationMarkersSkipped.as_str()).increment(count as u64);
    }
}
