//! wprpc - line-delimited JSON-RPC 2.0 bridge to the WordPress REST API
//!
//! This is the convenience crate that re-exports the wprpc sub-crates and
//! ships the `wprpc` binary.
//!
//! # Architecture
//!
//! - **wprpc-core**: Envelope types, codec, errors, credentials, observability
//! - **wprpc-server**: Line reader, router and the stdio serve loop
//! - **wprpc-wordpress**: Post methods and the WordPress HTTP client
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wprpc::{StdioServer, WordPressClient, WordPressConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WordPressConfig::from_env();
//!     let client = Arc::new(WordPressClient::new(&config)?);
//!
//!     let server = StdioServer::builder()
//!         .router(wprpc::wordpress::router(config.credentials, client))
//!         .build()?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub use wprpc_core as core;
pub use wprpc_server as server;
pub use wprpc_wordpress as wordpress;

pub use wprpc_server::{OutputOrder, StdioServer};
pub use wprpc_wordpress::{WordPressClient, WordPressConfig};
