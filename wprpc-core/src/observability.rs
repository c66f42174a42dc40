//! Logging and OpenTelemetry initialization
//!
//! Standard output is reserved for protocol lines, so every diagnostic this
//! module sets up is written to **standard error**. Two layers are installed:
//!
//! - **fmt layer**: human-readable or JSON log lines on stderr, filtered by `RUST_LOG`
//! - **OpenTelemetry layer**: spans exported over OTLP/gRPC (only when an endpoint is configured)
//!
//! When metrics are enabled, a global meter provider is registered so
//! `ServerMetrics` instruments are exported alongside the traces.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log level filter (default "info"); events on `STARTUP_TARGET`
//!   are kept at info whatever the filter says
//! - `WPRPC_LOG_FORMAT`: `text` (default) or `json`
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: Collector endpoint; enables traces and metrics when set
//! - `OTEL_SERVICE_NAME`: Service name reported to the collector (default "wprpc")
//!
//! # Usage Pattern
//!
//! ```rust,no_run
//! use wprpc_core::ObservabilityConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ObservabilityConfig::from_env();
//!     wprpc_core::init_observability(config).expect("Failed to init observability");
//!
//!     // ... serve stdin/stdout ...
//!
//!     wprpc_core::shutdown_observability();
//! }
//! ```

use opentelemetry::{global, KeyValue};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::sync::OnceLock;
use std::time::Duration;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log target for the startup announcement
pub const STARTUP_TARGET: &str = "wprpc::startup";

static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();
static METER_PROVIDER: OnceLock<SdkMeterProvider> = OnceLock::new();

/// Output format of the stderr log layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Parse a format name, falling back to `Text` for unknown values
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Observability configuration
///
/// # Defaults
///
/// - Service name: "wprpc"
/// - Service version: Current crate version
/// - OTLP endpoint: none (export disabled)
/// - Log level: "info"
/// - Log format: text
///
/// # Examples
///
/// ```rust
/// use wprpc_core::{LogFormat, ObservabilityConfig};
///
/// let config = ObservabilityConfig::new("wprpc-staging")
///     .with_endpoint("http://collector:4317")
///     .with_log_level("debug")
///     .with_log_format(LogFormat::Json);
/// assert!(config.enable_traces);
/// ```
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name for telemetry data
    pub service_name: String,

    /// Service version for telemetry data
    pub service_version: String,

    /// OTLP (OpenTelemetry Protocol) gRPC endpoint, if exporting
    pub otlp_endpoint: Option<String>,

    /// Export spans over OTLP
    pub enable_traces: bool,

    /// Export metrics over OTLP
    pub enable_metrics: bool,

    /// Log level filter used when `RUST_LOG` is not set
    pub log_level: String,

    /// Format of the stderr log lines
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "wprpc".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            otlp_endpoint: None,
            enable_traces: false,
            enable_metrics: false,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl ObservabilityConfig {
    /// Create a new configuration with a custom service name
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Build the configuration from the process environment
    ///
    /// Setting `OTEL_EXPORTER_OTLP_ENDPOINT` turns on both trace and metric
    /// export; without it only the stderr log layer is installed.
    pub fn from_env() -> Self {
        let mut config = match std::env::var("OTEL_SERVICE_NAME") {
            Ok(name) if !name.is_empty() => Self::new(name),
            _ => Self::default(),
        };
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = level;
        }
        if let Ok(format) = std::env::var("WPRPC_LOG_FORMAT") {
            config.log_format = LogFormat::parse(&format);
        }
        match std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
            Ok(endpoint) if !endpoint.is_empty() => config.with_endpoint(endpoint),
            _ => config,
        }
    }

    /// Set the OTLP collector endpoint and enable trace and metric export
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = Some(endpoint.into());
        self.enable_traces = true;
        self.enable_metrics = true;
        self
    }

    /// Set the log level filter
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the log line format
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// Set the service version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    /// Enable or disable span export
    pub fn with_traces(mut self, enable: bool) -> Self {
        self.enable_traces = enable;
        self
    }

    /// Enable or disable metric export
    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    fn resource(&self) -> opentelemetry_sdk::Resource {
        opentelemetry_sdk::Resource::builder_empty()
            .with_attributes(vec![
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                    self.service_name.clone(),
                ),
                KeyValue::new(
                    opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
                    self.service_version.clone(),
                ),
            ])
            .build()
    }
}

/// Initialize logging and, when configured, OpenTelemetry export
///
/// Call this **once** at startup, before serving. A second call returns an
/// error because the global subscriber is already set.
///
/// # Errors
///
/// - invalid log filter directives
/// - OTLP exporter construction failure
/// - a global subscriber already installed
pub fn init_observability(
    config: ObservabilityConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let endpoint = config.otlp_endpoint.clone();

    let tracer = match (&endpoint, config.enable_traces) {
        (Some(endpoint), true) => Some(init_tracer(&config, endpoint)?),
        _ => None,
    };

    if let (Some(endpoint), true) = (&endpoint, config.enable_metrics) {
        init_metrics(&config, endpoint)?;
    }

    init_tracing_subscriber(&config, tracer)?;

    tracing::debug!(
        service_name = %config.service_name,
        otlp_endpoint = ?endpoint,
        traces = config.enable_traces,
        metrics = config.enable_metrics,
        "Observability initialized"
    );

    Ok(())
}

/// Set up the OTLP span exporter and return a tracer for the tracing layer
fn init_tracer(
    config: &ObservabilityConfig,
    endpoint: &str,
) -> Result<opentelemetry_sdk::trace::Tracer, Box<dyn std::error::Error + Send + Sync>> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler};

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(config.resource())
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .build();

    let tracer = provider.tracer(config.service_name.clone());
    install_tracer_provider(provider);

    Ok(tracer)
}

/// Register the global tracer provider and keep a handle for shutdown
fn install_tracer_provider(provider: SdkTracerProvider) {
    global::set_tracer_provider(provider.clone());
    if TRACER_PROVIDER.set(provider).is_err() {
        tracing::warn!("Tracer provider already installed");
    }
}

/// Register the global meter provider and keep a handle for shutdown
fn install_meter_provider(provider: SdkMeterProvider) {
    global::set_meter_provider(provider.clone());
    if METER_PROVIDER.set(provider).is_err() {
        tracing::warn!("Meter provider already installed");
    }
}

/// Register a global meter provider exporting every 30 seconds
fn init_metrics(
    config: &ObservabilityConfig,
    endpoint: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use opentelemetry_otlp::WithExportConfig;

    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let reader = opentelemetry_sdk::metrics::PeriodicReader::builder(exporter)
        .with_interval(Duration::from_secs(30))
        .build();

    let provider = SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(config.resource())
        .build();

    install_meter_provider(provider);
    Ok(())
}

/// Install the global subscriber: env filter, optional OTLP layer, stderr fmt layer
fn init_tracing_subscriber(
    config: &ObservabilityConfig,
    tracer: Option<opentelemetry_sdk::trace::Tracer>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = log_filter(&config.log_level)?;

    let telemetry_layer = tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    let (json_layer, text_layer) = match config.log_format {
        LogFormat::Json => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_line_number(true)
                    .json(),
            ),
            None,
        ),
        LogFormat::Text => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(telemetry_layer)
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()?;

    Ok(())
}

/// `RUST_LOG` (or `fallback` when unset or invalid) with `STARTUP_TARGET` pinned at info
fn log_filter(fallback: &str) -> Result<EnvFilter, Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;
    let startup = format!("{}=info", STARTUP_TARGET).parse::<Directive>()?;
    Ok(filter.add_directive(startup))
}

/// Flush and shut down the OpenTelemetry providers
///
/// Pending spans and metrics are exported before this returns. It is safe
/// to call more than once; later calls find the providers already stopped.
pub fn shutdown_observability() {
    tracing::debug!("Shutting down observability");

    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            tracing::debug!(error = %e, "Tracer provider shutdown");
        }
    }
    if let Some(provider) = METER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            tracing::debug!(error = %e, "Meter provider shutdown");
        }
    }
}
