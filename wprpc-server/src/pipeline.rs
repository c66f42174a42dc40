//! Per-line request pipeline
//!
//! This module handles the lifecycle of a single input line:
//!
//! 1. **Decode**: Framing validation via `codec::decode_request`
//! 2. **Dispatch**: Route the request through the `Router`
//! 3. **Settle**: Turn the outcome (including a failed task) into a response
//! 4. **Encode**: Serialize the response to exactly one output line
//!
//! Every path through these steps yields a response envelope, so each input
//! line gets exactly one output line.

use crate::metrics::ServerMetrics;
use crate::router::Router;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinError;
use tokio::task::JoinHandle;
use wprpc_core::{codec, Error, Id, JsonRpcRequest, JsonRpcResponse};

/// Metric label for requests whose method is not registered
pub const UNKNOWN_METHOD: &str = "unknown";

/// A response on its way to the writer task
pub(crate) enum Outgoing {
    /// Already encoded and ready to write
    Ready(String),
    /// Still running; the writer awaits it in queue order
    Pending(Id, JoinHandle<JsonRpcResponse>),
}

/// Decode one line, producing the framing error response on failure
pub fn decode_line(
    line: &str,
    metrics: Option<&ServerMetrics>,
) -> std::result::Result<JsonRpcRequest, JsonRpcResponse> {
    codec::decode_request(line).map_err(|err| {
        tracing::warn!(error = %err, "Rejected line");
        if let Some(m) = metrics {
            m.record_error(err.kind());
            m.record_request(UNKNOWN_METHOD, "error", 0.0);
        }
        JsonRpcResponse::from_error(&err, Id::Null)
    })
}

/// Dispatch a validated request and build its response
#[tracing::instrument(name = "request", skip_all, fields(method = %request.method, id = %request.id))]
pub async fn handle_request(
    request: JsonRpcRequest,
    router: Router,
    metrics: Option<Arc<ServerMetrics>>,
) -> JsonRpcResponse {
    let start = Instant::now();
    let JsonRpcRequest { id, method, params, .. } = request;

    let response = match router.route(&method, params).await {
        Ok(result) => JsonRpcResponse::success(result, id),
        Err(err) => {
            tracing::warn!(kind = err.kind(), error = %err, "Request failed");
            if let Some(ref m) = metrics {
                m.record_error(err.kind());
            }
            JsonRpcResponse::from_error(&err, id)
        }
    };

    let elapsed = start.elapsed();
    let status = if response.is_success() { "success" } else { "error" };
    tracing::debug!(status, elapsed_ms = elapsed.as_millis() as u64, "Request finished");
    if let Some(ref m) = metrics {
        m.record_request(method_label(&router, &method), status, elapsed.as_secs_f64());
    }

    response
}

/// The method as a metric label; unregistered names collapse to one value
fn method_label<'a>(router: &Router, method: &'a str) -> &'a str {
    if router.has_method(method) {
        method
    } else {
        UNKNOWN_METHOD
    }
}

/// Decode and dispatch one line without spawning
pub async fn process_line(line: &str, router: &Router) -> JsonRpcResponse {
    match decode_line(line, None) {
        Ok(request) => handle_request(request, router.clone(), None).await,
        Err(response) => response,
    }
}

/// Convert the outcome of a request task into its response
///
/// A task that panicked or was cancelled still answers its request, with an
/// internal error carrying the original id.
pub fn settle(id: Id, joined: std::result::Result<JsonRpcResponse, JoinError>) -> JsonRpcResponse {
    match joined {
        Ok(response) => response,
        Err(join_err) => {
            tracing::error!(id = %id, error = %join_err, "Request task failed");
            let err = Error::Internal("request task failed".to_string());
            JsonRpcResponse::from_error(&err, id)
        }
    }
}

/// Serialize a response to one output line (without the trailing newline)
pub fn encode_line(response: &JsonRpcResponse) -> String {
    match codec::encode_response(response) {
        Ok(line) => line,
        Err(err) => {
            tracing::error!(error = %err, "Failed to encode response");
            let fallback = JsonRpcResponse::from_error(&err, response.id.clone());
            codec::encode_response(&fallback).unwrap_or_else(|_| {
                r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32000,"message":"Internal error"}}"#
                    .to_string()
            })
        }
    }
}
