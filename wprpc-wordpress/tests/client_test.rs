//! WordPressClient against a local fake WordPress site

use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use warp::http::StatusCode;
use warp::Filter;
use wprpc_core::Credentials;
use wprpc_wordpress::{
    Backend, BackendError, CreatePostParams, GetPostsParams, Operation, PostId, UpdatePostParams,
    WordPressClient, WordPressConfig,
};

/// Serve a minimal REST API that echoes what it received
async fn start_fake_site() -> SocketAddr {
    let api = warp::path!("wp-json" / "wp" / "v2" / "posts" / ..);

    let list = api
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(warp::header::optional::<String>("authorization"))
        .map(|query: HashMap<String, String>, auth: Option<String>| {
            warp::reply::json(&json!([{"query": query, "auth": auth}]))
        });

    let create = api
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::header::<String>("content-type"))
        .and(warp::body::json())
        .map(|content_type: String, body: Value| {
            warp::reply::with_status(
                warp::reply::json(&json!({"id": 1, "contentType": content_type, "received": body})),
                StatusCode::CREATED,
            )
        });

    let update = api
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .map(|id: String, body: Value| {
            if id == "404" {
                warp::reply::with_status(
                    warp::reply::json(&json!({
                        "code": "rest_post_invalid_id",
                        "message": "Invalid post ID.",
                        "data": {"status": 404}
                    })),
                    StatusCode::NOT_FOUND,
                )
            } else {
                warp::reply::with_status(
                    warp::reply::json(&json!({"id": id, "received": body})),
                    StatusCode::OK,
                )
            }
        });

    let broken = warp::path!("broken" / "wp-json" / "wp" / "v2" / "posts")
        .map(|| warp::reply::with_status("upstream exploded", StatusCode::BAD_GATEWAY));

    let plain = warp::path!("plain" / "wp-json" / "wp" / "v2" / "posts")
        .map(|| "not json at all");

    let slow = warp::path!("slow" / "wp-json" / "wp" / "v2" / "posts").and_then(|| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok::<_, warp::Rejection>(warp::reply::json(&json!([])))
    });

    let routes = list.or(create).or(update).or(broken).or(plain).or(slow);
    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

fn credentials(site: String) -> Credentials {
    Credentials::new(site, "admin", "secret")
}

fn client() -> WordPressClient {
    WordPressClient::new(&WordPressConfig::default()).unwrap()
}

fn list_op() -> Operation {
    GetPostsParams::default().into_operation().unwrap()
}

#[tokio::test]
async fn test_list_sends_paging_and_basic_auth() {
    let addr = start_fake_site().await;

    let result = client()
        .invoke(list_op(), &credentials(format!("http://{}/", addr)))
        .await
        .unwrap();

    assert_eq!(result[0]["query"], json!({"per_page": "10", "page": "1"}));
    // base64("admin:secret")
    assert_eq!(result[0]["auth"], "Basic YWRtaW46c2VjcmV0");
}

#[tokio::test]
async fn test_create_sends_json_body() {
    let addr = start_fake_site().await;
    let op = CreatePostParams {
        title: Some("Hello".into()),
        content: Some("World".into()),
        status: None,
    }
    .into_operation()
    .unwrap();

    let result = client()
        .invoke(op, &credentials(format!("http://{}", addr)))
        .await
        .unwrap();

    assert_eq!(result["id"], 1);
    assert_eq!(result["contentType"], "application/json");
    assert_eq!(
        result["received"],
        json!({"title": "Hello", "content": "World", "status": "draft"})
    );
}

#[tokio::test]
async fn test_update_sends_only_present_fields() {
    let addr = start_fake_site().await;
    let op = UpdatePostParams {
        post_id: Some(PostId::Number(15)),
        content: Some("Revised".into()),
        ..Default::default()
    }
    .into_operation()
    .unwrap();

    let result = client()
        .invoke(op, &credentials(format!("http://{}", addr)))
        .await
        .unwrap();

    assert_eq!(result, json!({"id": "15", "received": {"content": "Revised"}}));
}

#[tokio::test]
async fn test_error_body_message_is_used() {
    let addr = start_fake_site().await;
    let op = UpdatePostParams {
        post_id: Some(PostId::Number(404)),
        title: Some("x".into()),
        ..Default::default()
    }
    .into_operation()
    .unwrap();

    let err = client()
        .invoke(op, &credentials(format!("http://{}", addr)))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BackendError::Status {
            status: 404,
            message: "Invalid post ID.".into()
        }
    );
}

#[tokio::test]
async fn test_non_json_error_uses_status_code() {
    let addr = start_fake_site().await;

    let err = client()
        .invoke(list_op(), &credentials(format!("http://{}/broken", addr)))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(502));
    assert_eq!(err.to_string(), "Request failed with status code 502");
}

#[tokio::test]
async fn test_non_json_success_is_returned_as_string() {
    let addr = start_fake_site().await;

    let result = client()
        .invoke(list_op(), &credentials(format!("http://{}/plain", addr)))
        .await
        .unwrap();

    assert_eq!(result, Value::String("not json at all".into()));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client()
        .invoke(list_op(), &credentials(format!("http://{}", addr)))
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Transport(_)), "got {:?}", err);
    assert!(!err.to_string().is_empty());
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let addr = start_fake_site().await;
    let config = WordPressConfig::default().with_timeout(Duration::from_millis(200));
    let client = WordPressClient::new(&config).unwrap();

    let err = client
        .invoke(list_op(), &credentials(format!("http://{}/slow", addr)))
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Transport(_)), "got {:?}", err);
}
