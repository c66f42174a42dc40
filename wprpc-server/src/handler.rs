//! Handler traits and types for JSON-RPC methods
//!
//! A handler receives the request's parameter bag together with the
//! credentials the router resolved for it, and produces the result payload.
//!
//! # Creating Handlers
//!
//! 1. **from_fn**: Wrap an async closure that works with the raw parameter bag
//! 2. **from_typed_fn**: Wrap an async closure whose params are deserialized into a record
//!
//! # Why Box<dyn Future>?
//!
//! Different handlers have different concrete future types and the router
//! stores them in one map, so each call returns a boxed, pinned future.
//!
//! # Examples
//!
//! ```rust
//! use wprpc_server::{from_fn, from_typed_fn};
//! use serde::Deserialize;
//!
//! let ping = from_fn(|_params, _credentials| async move {
//!     Ok(serde_json::json!({"pong": true}))
//! });
//!
//! #[derive(Deserialize)]
//! struct EchoParams { text: Option<String> }
//!
//! let echo = from_typed_fn(|p: EchoParams, _credentials| async move {
//!     Ok(p.text.unwrap_or_default())
//! });
//! ```

use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use wprpc_core::{Credentials, Error, Params, Result};

/// Result type for handler functions
///
/// `Send` is required because every request runs on its own Tokio task.
pub type HandlerResult = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;

/// Trait for JSON-RPC method handlers
///
/// Handlers must be `Send + Sync`: one instance is shared by every
/// in-flight request for its method.
///
/// Errors returned from a handler become `-32000` responses whose message
/// is the error's display text.
pub trait Handler: Send + Sync {
    /// Handle one call
    ///
    /// # Arguments
    ///
    /// * `params` - The request's parameter bag (empty when absent)
    /// * `credentials` - Fully resolved backend credentials
    fn handle(&self, params: Params, credentials: Credentials) -> HandlerResult;
}

/// Adapter from an async function to a `Handler`
pub struct AsyncHandler<F, Fut>
where
    F: Fn(Params, Credentials) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    func: F,
}

impl<F, Fut> AsyncHandler<F, Fut>
where
    F: Fn(Params, Credentials) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    /// Create a new async handler from a function
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F, Fut> Handler for AsyncHandler<F, Fut>
where
    F: Fn(Params, Credentials) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    fn handle(&self, params: Params, credentials: Credentials) -> HandlerResult {
        Box::pin((self.func)(params, credentials))
    }
}

/// Create a handler from an async function that works with the raw bag
pub fn from_fn<F, Fut>(func: F) -> Box<dyn Handler>
where
    F: Fn(Params, Credentials) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    Box::new(AsyncHandler::new(func))
}

/// Create a handler whose parameter bag is deserialized into `P`
///
/// Unknown keys in the bag (including the credential overrides) are ignored
/// by the usual serde rules, so records only declare the fields they use.
///
/// # Error Handling
///
/// - Bag does not fit `P` (wrong JSON type for a field): `Error::Validation`
///   with the message `"Invalid params: <deserializer message>"`
/// - Result cannot be serialized: `Error::Serialization`
/// - Function errors are passed through unchanged
pub fn from_typed_fn<P, R, F, Fut>(func: F) -> Box<dyn Handler>
where
    P: serde::de::DeserializeOwned + Send + 'static,
    R: serde::Serialize + Send + 'static,
    F: Fn(P, Credentials) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    let func = Arc::new(func);

    from_fn(move |params: Params, credentials: Credentials| {
        let func = Arc::clone(&func);
        async move {
            let params: P = serde_json::from_value(Value::Object(params))
                .map_err(|e| Error::Validation(format!("Invalid params: {}", e)))?;

            let result = func(params, credentials).await?;

            serde_json::to_value(result).map_err(|e| Error::Serialization(e.to_string()))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Paging {
        #[serde(rename = "perPage")]
        per_page: Option<u32>,
    }

    fn creds() -> Credentials {
        Credentials::new("https://example.com", "admin", "secret")
    }

    #[tokio::test]
    async fn test_raw_handler_sees_params_and_credentials() {
        let handler = from_fn(|params: Params, credentials: Credentials| async move {
            Ok(json!({"keys": params.len(), "user": credentials.username}))
        });

        let params = wprpc_core::into_params(Some(json!({"a": 1, "b": 2})));
        let result = handler.handle(params, creds()).await.unwrap();

        assert_eq!(result, json!({"keys": 2, "user": "admin"}));
    }

    #[tokio::test]
    async fn test_typed_handler() {
        let handler = from_typed_fn(|p: Paging, _credentials| async move {
            Ok(p.per_page.unwrap_or(10))
        });

        let params = wprpc_core::into_params(Some(json!({"perPage": 25, "siteUrl": "x"})));
        let result = handler.handle(params, creds()).await.unwrap();
        assert_eq!(result, json!(25));

        let result = handler.handle(Params::new(), creds()).await.unwrap();
        assert_eq!(result, json!(10));
    }

    #[tokio::test]
    async fn test_typed_handler_rejects_wrong_field_type() {
        let handler = from_typed_fn(|p: Paging, _credentials| async move {
            Ok(p.per_page.unwrap_or(10))
        });

        let params = wprpc_core::into_params(Some(json!({"perPage": "many"})));
        let err = handler.handle(params, creds()).await.unwrap_err();

        match err {
            Error::Validation(msg) => assert!(msg.starts_with("Invalid params: ")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }
}
