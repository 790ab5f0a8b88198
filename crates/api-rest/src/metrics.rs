//! Prometheus metrics for the REST surface.
//!
//! Every routed request is counted and timed, labelled by method, matched route and status.
//! `GET /metrics` renders the registry in the Prometheus text format.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
    register_int_gauge_with_registry, CounterVec, Encoder, HistogramOpts, HistogramVec,
    Opts, Registry, TextEncoder,
};

const PROJECT_NAME: &str = "zenpic_api";
const PROJECT_TYPE: &str = "zenpic_metric_labels";
const METRICS_PATH: &str = "/metrics";

/// HTTP request metrics and the registry they live in.
#[derive(Debug, Clone)]
pub struct HttpMetrics {
    registry: Registry,

    /// Requests by method, matched route and status code.
    requests: Arc<CounterVec>,

    /// Request duration in seconds, same labels as `requests`.
    duration: Arc<HistogramVec>,
}

impl HttpMetrics {
    /// Creates the metrics in a fresh registry, with process metrics where supported.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests = register_counter_vec_with_registry!(
            Opts::new("http_requests_total", "Total number of HTTP requests")
                .const_label("project_name", PROJECT_NAME)
                .const_label("project_type", PROJECT_TYPE),
            &["method", "path", "status_code"],
            registry
        )?;

        let duration = register_histogram_vec_with_registry!(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds"
            )
            .const_label("project_name", PROJECT_NAME)
            .const_label("project_type", PROJECT_TYPE),
            &["method", "path", "status_code"],
            registry
        )?;

        // Always 1 while the process serves requests.
        let up = register_int_gauge_with_registry!(
            Opts::new("up", "1 while the service is up")
                .const_label("project_name", PROJECT_NAME)
                .const_label("project_type", PROJECT_TYPE),
            registry
        )?;
        up.set(1);

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry,
            requests: Arc::new(requests),
            duration: Arc::new(duration),
        })
    }

    /// Records one finished request.
    pub fn record_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status = status.to_string();
        let labels = [method, path, status.as_str()];
        self.requests.with_label_values(&labels).inc();
        self.duration
            .with_label_values(&labels)
            .observe(duration_secs);
    }

    /// Renders every registered metric in the Prometheus text format.
    pub fn render(&self) -> prometheus::Result<(String, Vec<u8>)> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok((encoder.format_type().to_string(), buffer))
    }
}

/// Middleware counting and timing each routed request.
///
/// Must be installed with `route_layer` so the matched route template is available; the
/// template rather than the raw URI keeps label cardinality bounded.
pub async fn track_requests(
    State(metrics): State<HttpMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned());
    let method = request.method().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    if let Some(path) = path.filter(|p| p != METRICS_PATH) {
        metrics.record_request(
            &method,
            &path,
            response.status().as_u16(),
            start.elapsed().as_secs_f64(),
        );
    }

    response
}
