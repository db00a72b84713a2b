//! Prometheus metrics for search and embedding operations.

use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Total number of hybrid search requests
    pub static ref SEARCH_REQUESTS: Counter = Counter::with_opts(
        Opts::new(
            "studentrag_search_requests_total",
            "Total number of hybrid search requests"
        )
    ).expect("Failed to create SEARCH_REQUESTS counter");

    /// Hybrid search latency in seconds
    pub static ref SEARCH_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "studentrag_search_latency_seconds",
            "Hybrid search latency in seconds"
        ).buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0])
    ).expect("Failed to create SEARCH_LATENCY histogram");

    /// Number of results returned per hybrid search
    pub static ref SEARCH_RESULTS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "studentrag_search_results_count",
            "Number of results returned per hybrid search"
        ).buckets(vec![0.0, 1.0, 5.0, 10.0, 20.0, 50.0])
    ).expect("Failed to create SEARCH_RESULTS histogram");

    /// Total embedding generation requests
    pub static ref EMBEDDING_REQUESTS: Counter = Counter::with_opts(
        Opts::new(
            "studentrag_embedding_requests_total",
            "Total embedding generation requests"
        )
    ).expect("Failed to create EMBEDDING_REQUESTS counter");

    /// Embedding generation latency in seconds
    pub static ref EMBEDDING_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "studentrag_embedding_latency_seconds",
            "Embedding generation latency in seconds"
        ).buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0])
    ).expect("Failed to create EMBEDDING_LATENCY histogram");
}

/// Register all metrics with the global registry. Call once at startup.
pub fn register_metrics() {
    REGISTRY
        .register(Box::new(SEARCH_REQUESTS.clone()))
        .expect("Failed to register SEARCH_REQUESTS");
    REGISTRY
        .register(Box::new(SEARCH_LATENCY.clone()))
        .expect("Failed to register SEARCH_LATENCY");
    REGISTRY
        .register(Box::new(SEARCH_RESULTS.clone()))
        .expect("Failed to register SEARCH_RESULTS");
    REGISTRY
        .register(Box::new(EMBEDDING_REQUESTS.clone()))
        .expect("Failed to register EMBEDDING_REQUESTS");
    REGISTRY
        .register(Box::new(EMBEDDING_LATENCY.clone()))
        .expect("Failed to register EMBEDDING_LATENCY");
}

/// Gather all metrics in the Prometheus exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Metrics contained invalid UTF-8: {}", e);
        String::new()
    })
}

/// Current metric values in human-readable form, for the stats command.
pub struct MetricSnapshot {
    pub search_requests_total: f64,
    pub search_latency_avg: f64,
    pub search_results_avg: f64,
    pub embedding_requests_total: f64,
    pub embedding_latency_avg: f64,
}

impl MetricSnapshot {
    pub fn capture() -> Self {
        Self {
            search_requests_total: SEARCH_REQUESTS.get(),
            search_latency_avg: histogram_avg(&SEARCH_LATENCY),
            search_results_avg: histogram_avg(&SEARCH_RESULTS),
            embedding_requests_total: EMBEDDING_REQUESTS.get(),
            embedding_latency_avg: histogram_avg(&EMBEDDING_LATENCY),
        }
    }
}

fn histogram_avg(histogram: &Histogram) -> f64 {
    let count = histogram.get_sample_count();
    if count == 0 {
        return 0.0;
    }
    histogram.get_sample_sum() / count as f64
}
