//! Server builder for constructing stdio JSON-RPC servers
//!
//! The builder provides a fluent API for configuring and creating a
//! `StdioServer`. It allows you to:
//! - Set the process-wide default credentials
//! - Register method handlers
//! - Choose the output ordering mode
//! - Enable pipeline metrics
//!
//! # Examples
//!
//! ```rust,no_run
//! use wprpc_core::Credentials;
//! use wprpc_server::{from_fn, OutputOrder, StdioServer};
//!
//! # fn example() -> wprpc_core::Result<()> {
//! let server = StdioServer::builder()
//!     .default_credentials(Credentials::from_env())
//!     .handler("ping", from_fn(|_, _| async {
//!         Ok(serde_json::json!({"pong": true}))
//!     }))
//!     .output_order(OutputOrder::Arrival)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use crate::{Handler, OutputOrder, Router, ServerMetrics, StdioServer};
use std::sync::Arc;
use wprpc_core::{Credentials, Result};

/// Builder for constructing a stdio JSON-RPC server
pub struct ServerBuilder {
    defaults: Credentials,
    handlers: Vec<(String, Box<dyn Handler>)>,
    router: Option<Router>,
    output_order: OutputOrder,
    metrics_service: Option<String>,
}

impl ServerBuilder {
    /// Create a new server builder with empty default credentials
    pub fn new() -> Self {
        Self {
            defaults: Credentials::default(),
            handlers: Vec::new(),
            router: None,
            output_order: OutputOrder::default(),
            metrics_service: None,
        }
    }

    /// Set the default credentials used when a request carries none
    pub fn default_credentials(mut self, defaults: Credentials) -> Self {
        self.defaults = defaults;
        self
    }

    /// Register a handler for a method
    pub fn handler(mut self, method: impl Into<String>, handler: Box<dyn Handler>) -> Self {
        self.handlers.push((method.into(), handler));
        self
    }

    /// Use a prebuilt router (its own defaults replace `default_credentials`)
    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// Set when responses are written relative to input order
    pub fn output_order(mut self, order: OutputOrder) -> Self {
        self.output_order = order;
        self
    }

    /// Record pipeline metrics on the global meter provider
    ///
    /// Install the provider first with `wprpc_core::init_observability`,
    /// otherwise the instruments are no-ops.
    pub fn with_metrics(mut self, service_name: impl Into<String>) -> Self {
        self.metrics_service = Some(service_name.into());
        self
    }

    /// Build the server
    pub fn build(self) -> Result<StdioServer> {
        let mut router = self.router.unwrap_or_else(|| Router::new(self.defaults));
        for (method, handler) in self.handlers {
            router.register(method, handler);
        }

        let metrics = self.metrics_service.map(|name| Arc::new(ServerMetrics::new(name)));

        tracing::debug!(
            methods = ?router.methods(),
            output_order = %self.output_order,
            metrics = metrics.is_some(),
            "Server built"
        );

        Ok(StdioServer {
            router,
            output_order: self.output_order,
            metrics,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
