//! JSON-RPC 2.0 envelope types for the line protocol
//!
//! Every input line is decoded into a [`JsonRpcRequest`] and answered by
//! exactly one [`JsonRpcResponse`]. The types are intentionally small:
//!
//! - **Protocol-compliant**: `jsonrpc` is always `"2.0"` on the way out
//! - **Faithful**: request ids are echoed with their exact JSON representation
//! - **Serializable**: Full serde support for JSON encoding/decoding
//!
//! # Request IDs
//!
//! Ids may be strings or numbers. Numbers are kept as `serde_json::Number`
//! rather than `i64` so `7`, `-3` and `1.5` all round-trip unchanged.
//! A literal null id is accepted and echoed; the server also answers
//! framing errors with a null id.

use crate::error::{Error, JsonRpcErrorData};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The only protocol version accepted and emitted
pub const JSONRPC_VERSION: &str = "2.0";

/// Open-ended parameter bag of a request
pub type Params = Map<String, Value>;

/// JSON-RPC 2.0 request ID
///
/// Uses `#[serde(untagged)]` so it serializes as the bare inner value.
///
/// # Examples
///
/// ```rust
/// use wprpc_core::Id;
///
/// let id1: Id = "req-123".into();
/// let id2: Id = 42i64.into();
///
/// assert_eq!(id1.to_string(), "\"req-123\"");
/// assert_eq!(id2.to_string(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// String identifier
    String(String),
    /// Numeric identifier, kept in its original JSON form
    Number(serde_json::Number),
    /// Null identifier, used for responses to unparsable lines
    Null,
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::String(s) => write!(f, "\"{}\"", s),
            Id::Number(n) => write!(f, "{}", n),
            Id::Null => write!(f, "null"),
        }
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::String(s)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(n.into())
    }
}

impl From<u64> for Id {
    fn from(n: u64) -> Self {
        Id::Number(n.into())
    }
}

/// JSON-RPC 2.0 request envelope
///
/// Produced by [`crate::codec::decode_request`] once a line has passed
/// framing validation. `method` and `params` are only checked for
/// structural presence here; semantic validation belongs to the handlers.
///
/// # Examples
///
/// ```rust
/// use wprpc_core::{JsonRpcRequest, Id};
/// use serde_json::json;
///
/// let req = JsonRpcRequest::new("get_posts", Some(json!({"perPage": 5})), Id::from(1i64));
/// assert_eq!(req.jsonrpc, "2.0");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version, `"2.0"` after validation
    pub jsonrpc: String,
    /// Request identifier, echoed unchanged in the response
    pub id: Id,
    /// Name of the operation to invoke
    pub method: String,
    /// Optional parameter bag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request
    pub fn new(method: impl Into<String>, params: Option<Value>, id: Id) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// Normalise an optional `params` value into a parameter bag
///
/// Absent, `null` and non-object params (arrays, scalars) all become an
/// empty bag, so named lookups behave as "field not provided".
pub fn into_params(params: Option<Value>) -> Params {
    match params {
        Some(Value::Object(map)) => map,
        _ => Params::new(),
    }
}

/// JSON-RPC 2.0 response envelope
///
/// Contains either a result or an error, never both. Use the
/// [`success`](Self::success) and [`error`](Self::error) factories, which
/// enforce the exclusivity by construction.
///
/// Field order matches the emitted line: `jsonrpc`, `id`, then `result` or
/// `error`.
///
/// # Examples
///
/// ```rust
/// use wprpc_core::{JsonRpcResponse, JsonRpcErrorData, Id};
/// use serde_json::json;
///
/// let success = JsonRpcResponse::success(json!([]), Id::from(1i64));
/// assert!(success.is_success());
///
/// let failure = JsonRpcResponse::error(JsonRpcErrorData::server_error("boom"), Id::from("a"));
/// assert!(failure.is_error());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always `"2.0"`
    pub jsonrpc: String,
    /// Id of the originating request, or null for framing errors
    pub id: Id,
    /// Result payload (success only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error object (failure only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcErrorData>,
}

impl JsonRpcResponse {
    /// Create a successful response carrying `result` unmodified
    pub fn success(result: Value, id: Id) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(error: JsonRpcErrorData, id: Id) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Build the response for a failed line
    ///
    /// Framing errors force the id to null regardless of what was passed,
    /// since the request id cannot be trusted when the envelope was rejected.
    pub fn from_error(err: &Error, id: Id) -> Self {
        let id = if err.is_parse_error() { Id::Null } else { id };
        Self::error(err.to_error_data(), id)
    }

    /// Check if the response represents a successful result
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Check if the response represents an error
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_display() {
        assert_eq!(Id::String("test".to_string()).to_string(), "\"test\"");
        assert_eq!(Id::from(42i64).to_string(), "42");
        assert_eq!(Id::Null.to_string(), "null");
    }

    #[test]
    fn test_id_keeps_number_representation() {
        for raw in ["7", "-3", "1.5"] {
            let id: Id = serde_json::from_str(raw).unwrap();
            assert!(matches!(id, Id::Number(_)));
            assert_eq!(serde_json::to_string(&id).unwrap(), raw);
        }
    }

    #[test]
    fn test_id_string_and_number_are_distinct() {
        let as_string: Id = serde_json::from_str("\"1\"").unwrap();
        let as_number: Id = serde_json::from_str("1").unwrap();
        assert_ne!(as_string, as_number);
    }

    #[test]
    fn test_success_response_layout() {
        let resp = JsonRpcResponse::success(json!([{"id": 1}]), Id::from(1i64));
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"jsonrpc":"2.0","id":1,"result":[{"id":1}]}"#);
    }

    #[test]
    fn test_success_with_null_result_keeps_field() {
        let resp = JsonRpcResponse::success(Value::Null, Id::from("x"));
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"jsonrpc":"2.0","id":"x","result":null}"#);
    }

    #[test]
    fn test_from_error_forces_null_id_for_parse_errors() {
        let err = Error::Parse("Invalid JSON-RPC version".into());
        let resp = JsonRpcResponse::from_error(&err, Id::from(9i64));
        assert_eq!(resp.id, Id::Null);
        assert_eq!(resp.error.unwrap().code, -32700);
    }

    #[test]
    fn test_from_error_echoes_id_for_semantic_errors() {
        let err = Error::MethodNotFound("nope".into());
        let resp = JsonRpcResponse::from_error(&err, Id::from("abc"));
        assert_eq!(resp.id, Id::from("abc"));
        assert!(resp.is_error());
        assert!(!resp.is_success());
    }

    #[test]
    fn test_into_params_normalises_non_objects() {
        assert!(into_params(None).is_empty());
        assert!(into_params(Some(Value::Null)).is_empty());
        assert!(into_params(Some(json!([1, 2]))).is_empty());

        let bag = into_params(Some(json!({"title": "T"})));
        assert_eq!(bag.get("title"), Some(&json!("T")));
    }
}
