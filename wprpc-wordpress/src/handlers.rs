//! JSON-RPC handlers for the post methods
//!
//! Each handler deserializes its params record, validates it into an
//! [`Operation`] and only then calls the backend. Validation failures never
//! reach the backend.

use crate::backend::Backend;
use crate::operation::{CreatePostParams, GetPostsParams, Operation, UpdatePostParams};
use crate::{CREATE_POST, GET_POSTS, UPDATE_POST};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use wprpc_core::{Credentials, Result};
use wprpc_server::{from_typed_fn, Handler, Router};

/// Register `create_post`, `get_posts` and `update_post` on a router
pub fn register(router: &mut Router, backend: Arc<dyn Backend>) {
    router.register(
        CREATE_POST,
        operation_handler(Arc::clone(&backend), CreatePostParams::into_operation),
    );
    router.register(
        GET_POSTS,
        operation_handler(Arc::clone(&backend), GetPostsParams::into_operation),
    );
    router.register(
        UPDATE_POST,
        operation_handler(backend, UpdatePostParams::into_operation),
    );
}

/// Build a router serving the post methods
pub fn router(defaults: Credentials, backend: Arc<dyn Backend>) -> Router {
    let mut router = Router::new(defaults);
    register(&mut router, backend);
    router
}

fn operation_handler<P>(backend: Arc<dyn Backend>, validate: fn(P) -> Result<Operation>) -> Box<dyn Handler>
where
    P: DeserializeOwned + Send + 'static,
{
    from_typed_fn(move |params: P, credentials: Credentials| {
        let backend = Arc::clone(&backend);
        async move {
            let operation = validate(params)?;
            tracing::debug!(method = operation.method(), "Calling backend");
            let payload = backend.invoke(operation, &credentials).await?;
            Ok(payload)
        }
    })
}
