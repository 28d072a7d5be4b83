//! Metrics collection for observability

use prometheus::{
    Counter, CounterVec, Histogram, Opts, Registry,
    register_counter_vec_with_registry, register_counter_with_registry,
    register_histogram_with_registry,
};
use std::sync::Arc;
use once_cell::sync::Lazy;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Categorization metrics
    pub categorize_requests: CounterVec,
    pub new_categories: Counter,

    // Classifier metrics
    pub classifier_requests: CounterVec,
    pub classifier_request_duration: Histogram,

    // Admin metrics
    pub questions_registered: Counter,
    pub csv_exports: Counter,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let registry = Registry::new();

        let categorize_requests = register_counter_vec_with_registry!(
            Opts::new("categorize_requests_total", "Total categorize requests"),
            &["status"],
            registry
        )?;

        let new_categories = register_counter_with_registry!(
            Opts::new("categories_created_total", "Total categories created"),
            registry
        )?;

        let classifier_requests = register_counter_vec_with_registry!(
            Opts::new("classifier_requests_total", "Total classifier calls"),
            &["outcome"],
            registry
        )?;

        let classifier_request_duration = register_histogram_with_registry!(
            "classifier_request_duration_seconds",
            "Classifier call duration in seconds",
            registry
        )?;

        let questions_registered = register_counter_with_registry!(
            Opts::new("questions_registered_total", "Total questions newly registered"),
            registry
        )?;

        let csv_exports = register_counter_with_registry!(
            Opts::new("csv_exports_total", "Total CSV exports served"),
            registry
        )?;

        Ok(Self {
            registry,
            categorize_requests,
            new_categories,
            classifier_requests,
            classifier_request_duration,
            questions_registered,
            csv_exports,
        })
    }

    /// Record a categorize request
    pub fn record_categorize(&self, success: bool, created_category: bool) {
        let status = if success { "success" } else { "error" };
        self.categorize_requests.with_label_values(&[status]).inc();
        if created_category {
            self.new_categories.inc();
        }
    }

    /// Record a classifier call outcome
    pub fn record_classifier_call(&self, outcome: &str) {
        self.classifier_requests.with_label_values(&[outcome]).inc();
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();

        String::from_utf8(buffer).unwrap_or_default()
    }
}
