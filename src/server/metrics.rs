use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all audio-depot metrics
const PREFIX: &str = "audio_depot";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Ingest Metrics
    pub static ref INGEST_UPLOADS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_ingest_uploads_total"), "Uploads by mode and outcome"),
        &["mode", "outcome"]
    ).expect("Failed to create ingest_uploads_total metric");

    // Store Metrics
    pub static ref STORED_FILES: Gauge = Gauge::new(
        format!("{PREFIX}_stored_files"),
        "Number of files currently stored"
    ).expect("Failed to create stored_files metric");
}

/// Upload mode label values.
pub const MODE_ANONYMOUS: &str = "anonymous";
pub const MODE_NAMED: &str = "named";

/// Upload outcome label values.
pub const OUTCOME_STORED: &str = "stored";
pub const OUTCOME_UNRECOGNIZED_SUBTYPE: &str = "unrecognized_subtype";
pub const OUTCOME_REJECTED: &str = "rejected";

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(INGEST_UPLOADS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(STORED_FILES.clone()));

    tracing::info!("Metrics system initialized successfully");
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

pub fn record_ingest(mode: &str, outcome: &str) {
    INGEST_UPLOADS_TOTAL.with_label_values(&[mode, outcome]).inc();
}

pub fn set_stored_files(count: usize) {
    STORED_FILES.set(count as f64);
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
