//! Core JSON-RPC 2.0 types and line codec for wprpc
//!
//! This crate provides the foundational pieces of the stdin/stdout bridge:
//!
//! - **Types**: Request and response envelopes, request ids, the params bag
//! - **Codec**: Framing validation of one input line and encoding of one output line
//! - **Error handling**: The flat `-32700` / `-32000` error taxonomy
//! - **Credentials**: Default and per-request backend credentials
//! - **Observability**: stderr logging and optional OpenTelemetry export
//!
//! # Architecture
//!
//! The crate is transport-agnostic. `wprpc-server` owns the line reader and
//! the serve loop; `wprpc-wordpress` owns the backend calls.
//!
//! # Example
//!
//! ```rust
//! use wprpc_core::{codec, JsonRpcResponse};
//!
//! let line = r#"{"jsonrpc":"1.0","id":1,"method":"get_posts"}"#;
//! let err = codec::decode_request(line).unwrap_err();
//!
//! let response = JsonRpcResponse::from_error(&err, wprpc_core::Id::Null);
//! let out = codec::encode_response(&response).unwrap();
//! assert_eq!(
//!     out,
//!     r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32700,"message":"Parse error","data":"Invalid JSON-RPC version"}}"#
//! );
//! ```

pub mod codec;
pub mod credentials;
pub mod error;
pub mod observability;
pub mod types;

pub use credentials::{Credentials, MISSING_CREDENTIALS};
pub use error::{Error, JsonRpcErrorData, Result, PARSE_ERROR, SERVER_ERROR};
pub use observability::{
    init_observability, shutdown_observability, LogFormat, ObservabilityConfig, STARTUP_TARGET,
};
pub use types::{into_params, Id, JsonRpcRequest, JsonRpcResponse, Params, JSONRPC_VERSION};
