//! WordPress REST API backend for wprpc
//!
//! This crate provides the three post methods served by the line server and
//! the HTTP client that carries them out:
//!
//! - `create_post`: `title` and `content` required, `status` defaults to `"draft"`
//! - `get_posts`: `perPage` (10) and `page` (1)
//! - `update_post`: `postId` required, `title`/`content`/`status` applied when present
//!
//! Backend failures surface as `-32000` errors whose message starts with
//! `"WordPress API error: "`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wprpc_server::StdioServer;
//! use wprpc_wordpress::{WordPressClient, WordPressConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WordPressConfig::from_env();
//! let client = WordPressClient::new(&config)?;
//!
//! let server = StdioServer::builder()
//!     .router(wprpc_wordpress::router(config.credentials, Arc::new(client)))
//!     .build()?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod handlers;
pub mod operation;

pub use backend::{Backend, BackendError};
pub use client::WordPressClient;
pub use config::WordPressConfig;
pub use handlers::{register, router};
pub use operation::{
    CreatePostParams, GetPostsParams, NewPost, Operation, PostChanges, PostId, PostQuery,
    PostUpdate, UpdatePostParams,
};

/// Method name for creating a post
pub const CREATE_POST: &str = "create_post";
/// Method name for listing posts
pub const GET_POSTS: &str = "get_posts";
/// Method name for updating a post
pub const UPDATE_POST: &str = "update_post";
