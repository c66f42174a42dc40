//! Server metrics definitions
//!
//! OpenTelemetry instruments for the line pipeline. They are recorded only
//! when metrics are enabled on the builder, and exported through whatever
//! global meter provider `wprpc_core::init_observability` installed.
//!
//! # Metrics Collected
//!
//! - **lines_total**: Input lines read (counter)
//! - **requests_total**: Responses emitted, by method and status (counter)
//! - **request_duration**: Line processing latency in seconds (histogram)
//! - **errors_total**: Error responses, by error kind (counter)
//!
//! # Examples
//!
//! ```rust,no_run
//! use wprpc_server::ServerMetrics;
//!
//! let metrics = ServerMetrics::new("wprpc");
//! metrics.record_line();
//! metrics.record_request("get_posts", "success", 0.120);
//! ```

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

/// Server metrics for monitoring
///
/// All metrics are prefixed with `wprpc.server.*`.
pub struct ServerMetrics {
    /// Number of input lines read
    pub lines_total: Counter<u64>,
    /// Number of responses emitted
    pub requests_total: Counter<u64>,
    /// Request processing duration in seconds
    pub request_duration: Histogram<f64>,
    /// Number of error responses
    pub errors_total: Counter<u64>,
}

impl ServerMetrics {
    /// Create a new ServerMetrics instance on the global meter provider
    pub fn new(service_name: impl Into<String>) -> Self {
        let name: &'static str = Box::leak(service_name.into().into_boxed_str());
        let meter = global::meter(name);
        Self::new_with_meter(&meter)
    }

    /// Create a new ServerMetrics instance with a custom meter
    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            lines_total: meter
                .u64_counter("wprpc.server.lines.total")
                .with_description("Total number of input lines read")
                .build(),
            requests_total: meter
                .u64_counter("wprpc.server.requests.total")
                .with_description("Total number of responses emitted")
                .build(),
            request_duration: meter
                .f64_histogram("wprpc.server.request.duration")
                .with_description("Request processing duration in seconds")
                .build(),
            errors_total: meter
                .u64_counter("wprpc.server.errors.total")
                .with_description("Total number of error responses")
                .build(),
        }
    }

    /// Record one input line
    pub fn record_line(&self) {
        self.lines_total.add(1, &[]);
    }

    /// Record a finished request
    pub fn record_request(&self, method: &str, status: &str, duration_secs: f64) {
        let attributes = &[
            KeyValue::new("method", method.to_string()),
            KeyValue::new("status", status.to_string()),
        ];
        self.requests_total.add(1, attributes);
        self.request_duration.record(duration_secs, attributes);
    }

    /// Record an error response
    pub fn record_error(&self, kind: &str) {
        self.errors_total
            .add(1, &[KeyValue::new("kind", kind.to_string())]);
    }
}
