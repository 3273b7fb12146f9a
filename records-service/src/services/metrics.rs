//! Prometheus metrics for records-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Records written, by entity and action.
pub static RECORDS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "records_writes_total",
        "Total number of record writes by entity and action",
        &["entity", "action"] // student|professor|library_membership|proctorship, created|updated|deleted
    )
    .expect("Failed to register records_writes_total")
});

/// Handler failures answered with a generic error envelope.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "records_errors_total",
        "Total number of unexpected handler errors by operation",
        &["operation"]
    )
    .expect("Failed to register records_errors_total")
});

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "records_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register records_db_query_duration_seconds")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&RECORDS_TOTAL);
    Lazy::force(&ERRORS_TOTAL);
    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&service_core::middleware::metrics::HTTP_REQUESTS_TOTAL);
    Lazy::force(&service_core::middleware::metrics::HTTP_REQUEST_DURATION_SECONDS);
}

pub fn record_write(entity: &str, action: &str) {
    RECORDS_TOTAL.with_label_values(&[entity, action]).inc();
}

pub fn record_error(operation: &str) {
    ERRORS_TOTAL.with_label_values(&[operation]).inc();
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
