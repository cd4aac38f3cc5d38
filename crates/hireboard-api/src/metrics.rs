//! Prometheus metrics for the API server.

use std::sync::LazyLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use regex_lite::Regex;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "hireboard_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "hireboard_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "hireboard_http_requests_in_flight";

    // Application lifecycle
    pub const APPLICATIONS_SUBMITTED_TOTAL: &str = "hireboard_applications_submitted_total";
    pub const APPLICATIONS_DELETED_TOTAL: &str = "hireboard_applications_deleted_total";
    pub const APPLICATION_STATUS_UPDATES_TOTAL: &str = "hireboard_application_status_updates_total";
    pub const RESUME_BYTES: &str = "hireboard_resume_bytes";

    // Access control
    pub const AUTH_FAILURES_TOTAL: &str = "hireboard_auth_failures_total";
    pub const ACCESS_DENIED_TOTAL: &str = "hireboard_access_denied_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "hireboard_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record an accepted submission and its resume size.
pub fn record_application_submitted(content_type: &str, resume_bytes: usize) {
    let labels = [("content_type", content_type.to_string())];
    counter!(names::APPLICATIONS_SUBMITTED_TOTAL, &labels).increment(1);
    histogram!(names::RESUME_BYTES, &labels).record(resume_bytes as f64);
}

pub fn record_application_deleted() {
    counter!(names::APPLICATIONS_DELETED_TOTAL).increment(1);
}

pub fn record_status_update(status: &str) {
    let labels = [("status", status.to_string())];
    counter!(names::APPLICATION_STATUS_UPDATES_TOTAL, &labels).increment(1);
}

/// Record a rejected session.
pub fn record_auth_failure(reason: &str) {
    let labels = [("reason", reason.to_string())];
    counter!(names::AUTH_FAILURES_TOTAL, &labels).increment(1);
}

/// Record a role or ownership denial.
pub fn record_access_denied(operation: &str) {
    let labels = [("operation", operation.to_string())];
    counter!(names::ACCESS_DENIED_TOTAL, &labels).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", sanitize_path(endpoint))];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

static UUID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("static pattern")
});

static APPLICATION_ID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/application/(delete|resume|status/update)/[^/]+").expect("static pattern")
});

static JOB_ID_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/job/[^/]+$").expect("static pattern"));

/// Sanitize path for metrics labels (remove IDs, etc.).
fn sanitize_path(path: &str) -> String {
    let path = UUID_SEGMENT.replace_all(path, ":id");
    let path = APPLICATION_ID_SEGMENT.replace_all(&path, "/application/$1/:id");
    if path.ends_with("/job/getall") {
        return path.to_string();
    }
    JOB_ID_SEGMENT.replace_all(&path, "/job/:id").to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(
            sanitize_path("/api/v1/application/resume/550e8400-e29b-41d4-a716-446655440000"),
            "/api/v1/application/resume/:id"
        );
        assert_eq!(
            sanitize_path("/api/v1/application/status/update/legacy_01"),
            "/api/v1/application/status/update/:id"
        );
        assert_eq!(
            sanitize_path("/api/v1/application/delete/abc"),
            "/api/v1/application/delete/:id"
        );
        assert_eq!(sanitize_path("/api/v1/job/getall"), "/api/v1/job/getall");
        assert_eq!(sanitize_path("/api/v1/job/abc123"), "/api/v1/job/:id");
        assert_eq!(
            sanitize_path("/api/v1/application/employer/getall"),
            "/api/v1/application/employer/getall"
        );
    }
}
