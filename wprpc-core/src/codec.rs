//! Codec for the line protocol
//!
//! This module turns one raw input line into a validated request envelope and
//! one response envelope back into one output line.
//!
//! # Framing Validation
//!
//! Decoding happens in two steps so that a version mismatch can be reported
//! with a stable diagnostic:
//!
//! 1. The line is parsed as generic JSON. Invalid syntax becomes
//!    `Error::Parse` carrying the parser message.
//! 2. The `jsonrpc` member must be exactly `"2.0"`. Anything else (including a
//!    missing member or a non-object line) becomes `Error::Parse` with the
//!    message `"Invalid JSON-RPC version"`.
//!
//! Only then is the value deserialized into a `JsonRpcRequest`; a structural
//! failure there (missing `method` or `id`) is still a framing error.
//!
//! # Examples
//!
//! ```rust
//! use wprpc_core::{codec, Error};
//!
//! let request = codec::decode_request(r#"{"jsonrpc":"2.0","id":1,"method":"get_posts"}"#).unwrap();
//! assert_eq!(request.method, "get_posts");
//!
//! let err = codec::decode_request("not-json").unwrap_err();
//! assert!(matches!(err, Error::Parse(_)));
//! ```

use crate::error::{Error, Result};
use crate::types::{JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION};
use serde::Serialize;
use serde_json::Value;

/// Diagnostic carried in `error.data` when the version member is wrong
pub const INVALID_VERSION: &str = "Invalid JSON-RPC version";

/// Encode any serializable message to a single-line JSON string
///
/// `serde_json::to_string` never emits raw newlines (they are escaped inside
/// strings), so the result is always safe to write as one protocol line.
///
/// # Errors
///
/// Returns `Error::Serialization` if the message cannot be serialized.
pub fn encode<T: Serialize>(msg: &T) -> Result<String> {
    serde_json::to_string(msg).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode and validate one input line into a request envelope
///
/// # Errors
///
/// Every failure is `Error::Parse`:
/// - invalid JSON: the parser's message (e.g. "expected value at line 1 column 1")
/// - wrong or missing `jsonrpc`: [`INVALID_VERSION`]
/// - structurally incomplete envelope: the deserializer's message
pub fn decode_request(line: &str) -> Result<JsonRpcRequest> {
    let value: Value = serde_json::from_str(line).map_err(|e| Error::Parse(e.to_string()))?;

    if value.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        return Err(Error::Parse(INVALID_VERSION.to_string()));
    }

    serde_json::from_value(value).map_err(|e| Error::Parse(e.to_string()))
}

/// Encode a response envelope to one output line (without the newline)
pub fn encode_response(resp: &JsonRpcResponse) -> Result<String> {
    encode(resp)
}
