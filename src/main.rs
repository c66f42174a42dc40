//! `wprpc` binary: serves the post methods on stdin/stdout
//!
//! Configuration comes from the environment:
//!
//! - `WORDPRESS_SITE_URL`, `WORDPRESS_USERNAME`, `WORDPRESS_PASSWORD`: default credentials
//! - `WORDPRESS_TIMEOUT_SECS`: backend request timeout
//! - `WPRPC_OUTPUT_ORDER`: `completion` (default) or `arrival`
//! - `RUST_LOG`, `WPRPC_LOG_FORMAT`: stderr logging
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: enables OpenTelemetry export

use anyhow::Context;
use std::sync::Arc;
use wprpc::core::{
    init_observability, shutdown_observability, ObservabilityConfig, STARTUP_TARGET,
};
use wprpc::{OutputOrder, StdioServer, WordPressClient, WordPressConfig};

async fn serve() -> anyhow::Result<()> {
    let observability = ObservabilityConfig::from_env();
    let service_name = observability.service_name.clone();
    let metrics = observability.enable_metrics;
    init_observability(observability)
        .map_err(|e| anyhow::anyhow!("Failed to initialize observability: {}", e))?;

    let config = WordPressConfig::from_env();
    let client = WordPressClient::new(&config).context("Failed to create WordPress client")?;

    let mut builder = StdioServer::builder()
        .router(wprpc::wordpress::router(config.credentials, Arc::new(client)))
        .output_order(OutputOrder::from_env());
    if metrics {
        builder = builder.with_metrics(service_name);
    }
    let server = builder.build()?;

    tracing::info!(target: STARTUP_TARGET, "WordPress MCP server running on stdin/stdout");

    server.run().await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let code = match serve().await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "Server stopped");
            eprintln!("Error: {:#}", e);
            1
        }
    };

    shutdown_observability();

    // Tokio's stdin reads on a blocking thread that runtime shutdown would
    // wait for, so leave without unwinding the runtime.
    std::process::exit(code);
}
