//! Error types for wprpc
//!
//! This module defines the two error layers used throughout the bridge:
//!
//! - **Error**: Application-level errors raised while processing a line (uses thiserror)
//! - **JsonRpcErrorData**: The wire-format `error` object written back to the caller
//!
//! # Flat Error Taxonomy
//!
//! The protocol deliberately uses only two codes:
//! - `-32700`: Framing error (unparsable line or wrong protocol version)
//! - `-32000`: Everything else (validation, unknown method, backend failure)
//!
//! There is no finer-grained code space. Callers distinguish failures by the
//! human-readable `message`, which is why the message texts are part of the
//! observable contract (for example the `"WordPress API error: "` prefix).
//!
//! # Examples
//!
//! ```rust
//! use wprpc_core::{Error, JsonRpcErrorData};
//!
//! let error = Error::MethodNotFound("delete_post".into());
//! let data: JsonRpcErrorData = error.to_error_data();
//! assert_eq!(data.code, -32000);
//! assert_eq!(data.message, "Unknown method: delete_post");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code for framing errors: invalid JSON or a protocol version mismatch
pub const PARSE_ERROR: i32 = -32700;

/// Code for every non-framing failure
pub const SERVER_ERROR: i32 = -32000;

/// Result type for wprpc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Application-level error type for wprpc
///
/// Each variant corresponds to one failure class of the line pipeline.
/// Every variant can be turned into a wire error with [`Error::to_error_data`],
/// and that conversion is total: no error escapes a line unanswered.
///
/// # Error Categories
///
/// - **Framing**: Parse
/// - **Semantic**: Validation, MethodNotFound
/// - **Downstream**: Backend
/// - **Local**: Serialization, Io, Internal
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The line could not be decoded into a request envelope
    ///
    /// Holds the parser's diagnostic, which is sent back as `error.data`.
    /// Responses for this variant always carry a null id.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A required field or the credentials are missing
    ///
    /// The message is sent verbatim, so it must be caller-facing text.
    #[error("{0}")]
    Validation(String),

    /// No handler is registered for the requested method
    #[error("Unknown method: {0}")]
    MethodNotFound(String),

    /// The content backend rejected or failed the call
    ///
    /// Holds the message extracted from the backend's error body when
    /// available, else the raw transport error text.
    #[error("WordPress API error: {0}")]
    Backend(String),

    /// Serialization or deserialization error outside of request framing
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Input/output error on the protocol streams
    #[error("IO error: {0}")]
    Io(String),

    /// Unexpected failure inside the server (e.g. a panicked line task)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convert this error into its wire representation
    ///
    /// Framing errors become `-32700` with the fixed message `"Parse error"`
    /// and the parser diagnostic in `data`. All other variants become
    /// `-32000` with the error's display text as the message and no `data`.
    pub fn to_error_data(&self) -> JsonRpcErrorData {
        match self {
            Error::Parse(detail) => JsonRpcErrorData::parse_error(detail.clone()),
            other => JsonRpcErrorData::server_error(other.to_string()),
        }
    }

    /// Whether this error is a framing failure (the response id must be null)
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Parse(_))
    }

    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Parse(_) => "parse",
            Error::Validation(_) => "validation",
            Error::MethodNotFound(_) => "method",
            Error::Backend(_) => "backend",
            Error::Serialization(_) => "serialization",
            Error::Io(_) => "io",
            Error::Internal(_) => "internal",
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// JSON-RPC 2.0 error object as written on the wire
///
/// Appears in the `error` field of a failure response.
///
/// # Examples
///
/// ```rust
/// use wprpc_core::JsonRpcErrorData;
///
/// let error = JsonRpcErrorData::parse_error("expected value at line 1 column 1");
/// assert_eq!(error.code, -32700);
/// assert_eq!(error.message, "Parse error");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorData {
    /// Numeric error code (`-32700` or `-32000`)
    pub code: i32,

    /// Human-readable error message
    pub message: String,

    /// Optional diagnostic detail, omitted from the JSON when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcErrorData {
    /// Create a new error object with code and message
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create a new error object with additional diagnostic data
    pub fn with_data(code: i32, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create a framing error (-32700)
    ///
    /// The message is always `"Parse error"`; `detail` is carried as `data`.
    pub fn parse_error(detail: impl Into<String>) -> Self {
        Self::with_data(PARSE_ERROR, "Parse error", serde_json::Value::String(detail.into()))
    }

    /// Create a generic server error (-32000)
    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(SERVER_ERROR, message)
    }
}

impl std::fmt::Display for JsonRpcErrorData {
    /// Formats as "[code] message", e.g. "[-32000] Unknown method: foo"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcErrorData {}
