//! Router for JSON-RPC method dispatch
//!
//! The router is the method dispatcher of the line pipeline. For each call it:
//!
//! 1. Normalises `params` into a parameter bag
//! 2. Resolves credentials (request values over the configured defaults)
//! 3. Looks up the handler for the method name
//! 4. Invokes the handler with the bag and the resolved credentials
//!
//! Credentials are resolved before the method lookup, so a request with no
//! usable credentials fails with the credentials message even if its method
//! is unknown.
//!
//! # Thread Safety
//!
//! Routers are cheaply cloneable (`Arc`-based) and read-only once built, so
//! every line task holds its own clone without any locking.
//!
//! # Examples
//!
//! ```rust
//! use wprpc_core::Credentials;
//! use wprpc_server::{Router, from_fn};
//!
//! let mut router = Router::new(Credentials::new("https://example.com", "admin", "secret"));
//! router.register("ping", from_fn(|_, _| async {
//!     Ok(serde_json::json!({"pong": true}))
//! }));
//! assert!(router.has_method("ping"));
//! ```

use crate::handler::Handler;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use wprpc_core::{into_params, Credentials, Error, Result};

/// Router for JSON-RPC methods
#[derive(Clone)]
pub struct Router {
    /// Map of method names to their handler implementations
    handlers: Arc<HashMap<String, Arc<dyn Handler>>>,
    /// Process-wide default credentials, fixed at construction
    defaults: Arc<Credentials>,
}

impl Router {
    /// Create an empty router with the given default credentials
    pub fn new(defaults: Credentials) -> Self {
        Self {
            handlers: Arc::new(HashMap::new()),
            defaults: Arc::new(defaults),
        }
    }

    /// Register a handler for a method
    pub fn register(&mut self, method: impl Into<String>, handler: Box<dyn Handler>) {
        let handlers = Arc::make_mut(&mut self.handlers);
        handlers.insert(method.into(), Arc::from(handler));
    }

    /// Check if a method is registered
    pub fn has_method(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Get all registered method names, sorted
    pub fn methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = self.handlers.keys().cloned().collect();
        methods.sort();
        methods
    }

    /// The default credentials this router was built with
    pub fn default_credentials(&self) -> &Credentials {
        &self.defaults
    }

    /// Route a method call to its handler
    ///
    /// # Errors
    ///
    /// - `Error::Validation` if no complete credential set can be resolved
    /// - `Error::MethodNotFound` if no handler is registered for `method`
    /// - whatever the handler returns
    pub async fn route(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let params = into_params(params);
        let credentials = Credentials::resolve(&params, &self.defaults)?;

        let handler = self
            .handlers
            .get(method)
            .ok_or_else(|| Error::MethodNotFound(method.to_string()))?;

        handler.handle(params, credentials).await
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(Credentials::default())
    }
}
