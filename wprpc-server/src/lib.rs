//! Line-delimited JSON-RPC 2.0 server over stdin/stdout
//!
//! This crate reads one JSON-RPC request per input line, dispatches it to a
//! registered handler and writes exactly one response line per input line.
//! Handlers receive the request's parameter bag together with credentials
//! resolved against process-wide defaults.
//!
//! # Core Features
//!
//! - **Line Transport**: Newline-delimited JSON on any `AsyncRead`/`AsyncWrite` pair
//! - **Method Routing**: Register handlers for JSON-RPC methods
//! - **Credential Resolution**: Per-request overrides merged over defaults
//! - **Concurrent Dispatch**: Every line runs on its own task
//! - **Output Ordering**: Completion order (default) or arrival order
//! - **Observability**: Tracing spans per line and optional OpenTelemetry metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use wprpc_core::Credentials;
//! use wprpc_server::{from_typed_fn, StdioServer};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct EchoParams { text: Option<String> }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = StdioServer::builder()
//!         .default_credentials(Credentials::from_env())
//!         .handler("echo", from_typed_fn(|p: EchoParams, _credentials| async move {
//!             Ok(p.text.unwrap_or_default())
//!         }))
//!         .build()?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Reader loop**: Splits input into lines and decodes each envelope.
//!   Framing errors are answered immediately without spawning.
//! - **Request tasks**: One Tokio task per decoded request runs the router.
//! - **Writer task**: The only owner of the output stream. It writes whole
//!   lines, so responses never interleave.
//!
//! At end of input the reader stops, in-flight requests finish and their
//! responses are written before `serve` returns.

mod builder;
mod handler;
mod lines;
mod metrics;
mod order;
mod pipeline;
mod router;

pub use builder::ServerBuilder;
pub use handler::{from_fn, from_typed_fn, AsyncHandler, Handler, HandlerResult};
pub use lines::LineReader;
pub use metrics::ServerMetrics;
pub use order::{OutputOrder, OUTPUT_ORDER_ENV};
pub use pipeline::{decode_line, encode_line, handle_request, process_line, settle};
pub use router::Router;

use pipeline::Outgoing;
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use wprpc_core::{Error, Result};

/// JSON-RPC 2.0 server over a pair of byte streams
///
/// # Lifecycle
///
/// 1. **Build**: Create the server using `StdioServer::builder()`
/// 2. **Serve**: Call `run()` for stdin/stdout, or `serve()` for any streams
/// 3. **Stop**: End of input drains in-flight requests; an interrupt stops at once
///
/// The server is stateless across lines. Its router and metrics are shared
/// read-only by every request task.
pub struct StdioServer {
    router: Router,
    output_order: OutputOrder,
    metrics: Option<Arc<ServerMetrics>>,
}

impl StdioServer {
    /// Create a new server builder
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// The router requests are dispatched through
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// The configured output ordering mode
    pub fn output_order(&self) -> OutputOrder {
        self.output_order
    }

    /// Serve stdin/stdout until end of input or an interrupt signal
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading stdin or writing stdout fails.
    #[tracing::instrument(skip(self), name = "server.run")]
    pub async fn run(&self) -> Result<()> {
        let interrupt = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Unable to listen for interrupt signal");
                std::future::pending::<()>().await;
            }
        };

        self.serve_with_shutdown(tokio::io::stdin(), tokio::io::stdout(), interrupt)
            .await
    }

    /// Serve the given streams until end of input
    ///
    /// Returns once every response for every line read has been written.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        self.serve_with_shutdown(reader, writer, std::future::pending())
            .await
    }

    /// Serve the given streams until end of input or until `shutdown` resolves
    ///
    /// End of input drains outstanding requests. Shutdown does not: pending
    /// responses are abandoned and the writer is stopped.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if a read or write fails. A write failure stops the
    /// reader, since no further response could be delivered.
    pub async fn serve_with_shutdown<R, W, S>(&self, reader: R, writer: W, shutdown: S) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
        S: Future<Output = ()>,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let writer_task = tokio::spawn(write_loop(writer, rx));

        let mut lines = LineReader::new(reader);
        tokio::pin!(shutdown);

        tracing::info!(output_order = %self.output_order, "Serving requests");

        let read_result = loop {
            let next = tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, abandoning in-flight requests");
                    writer_task.abort();
                    return Ok(());
                }
                next = lines.next_line() => next,
            };

            match next {
                Ok(Some(line)) => {
                    if !self.dispatch(line, &tx) {
                        tracing::error!("Output stream closed, stopping reader");
                        break Ok(());
                    }
                }
                Ok(None) => {
                    tracing::info!("End of input, draining in-flight requests");
                    break Ok(());
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read input");
                    break Err(e);
                }
            }
        };

        drop(tx);
        let write_result = match writer_task.await {
            Ok(result) => result,
            Err(e) => Err(Error::Internal(format!("writer task failed: {}", e))),
        };

        read_result.and(write_result)
    }

    /// Hand one line to the pipeline; returns false once the writer is gone
    fn dispatch(&self, line: String, tx: &mpsc::UnboundedSender<Outgoing>) -> bool {
        if let Some(ref m) = self.metrics {
            m.record_line();
        }

        let request = match pipeline::decode_line(&line, self.metrics.as_deref()) {
            Ok(request) => request,
            Err(response) => {
                return tx.send(Outgoing::Ready(encode_line(&response))).is_ok();
            }
        };

        let id = request.id.clone();
        let handle = tokio::spawn(handle_request(
            request,
            self.router.clone(),
            self.metrics.clone(),
        ));

        match self.output_order {
            OutputOrder::Arrival => tx.send(Outgoing::Pending(id, handle)).is_ok(),
            OutputOrder::Completion => {
                if tx.is_closed() {
                    return false;
                }
                let tx = tx.clone();
                tokio::spawn(async move {
                    let response = settle(id, handle.await);
                    let _ = tx.send(Outgoing::Ready(encode_line(&response)));
                });
                true
            }
        }
    }
}

/// Sole writer of the output stream
///
/// Runs until every sender is dropped, i.e. the reader has stopped and every
/// forwarding task has delivered its response.
async fn write_loop<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<Outgoing>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(outgoing) = rx.recv().await {
        let line = match outgoing {
            Outgoing::Ready(line) => line,
            Outgoing::Pending(id, handle) => encode_line(&settle(id, handle.await)),
        };

        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    Ok(())
}
