//! Metrics and observability utilities
//!
//! Prometheus metrics through the `metrics` facade. Names share the
//! `airport_` prefix; histograms use the request latency buckets below.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::{Duration, Instant};

/// Metrics prefix for all booking service metrics
pub const METRICS_PREFIX: &str = "airport";

/// Histogram buckets for request and order latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Booking metrics
    describe_counter!(
        format!("{}_orders_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total orders committed"
    );

    describe_counter!(
        format!("{}_tickets_booked_total", METRICS_PREFIX),
        Unit::Count,
        "Total tickets committed"
    );

    describe_counter!(
        format!("{}_seat_conflicts_total", METRICS_PREFIX),
        Unit::Count,
        "Orders rejected because a seat was already taken"
    );

    describe_histogram!(
        format!("{}_order_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Order placement latency in seconds"
    );

    // Media
    describe_counter!(
        format!("{}_images_uploaded_total", METRICS_PREFIX),
        Unit::Count,
        "Total airplane images stored"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record a committed order
pub fn record_order(duration: Duration, tickets: usize) {
    counter!(format!("{}_orders_created_total", METRICS_PREFIX)).increment(1);
    counter!(format!("{}_tickets_booked_total", METRICS_PREFIX)).increment(tickets as u64);
    histogram!(format!("{}_order_duration_seconds", METRICS_PREFIX)).record(duration.as_secs_f64());
}

/// Record an order rejected for a taken seat
pub fn record_seat_conflict() {
    counter!(format!("{}_seat_conflicts_total", METRICS_PREFIX)).increment(1);
}

pub fn record_image_upload() {
    counter!(format!("{}_images_uploaded_total", METRICS_PREFIX)).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets_ascend() {
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_recorders_without_exporter() {
        RequestMetrics::start("GET", "/api/airport/flights").finish(200);
        record_order(Duration::from_millis(12), 2);
        record_seat_conflict();
    }
}
