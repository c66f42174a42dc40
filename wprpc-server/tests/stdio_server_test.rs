//! End-to-end tests of the line pipeline over in-memory streams

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Barrier;
use wprpc_core::Credentials;
use wprpc_server::{from_fn, OutputOrder, StdioServer};

fn defaults() -> Credentials {
    Credentials::new("https://example.com", "admin", "secret")
}

fn server(order: OutputOrder) -> StdioServer {
    StdioServer::builder()
        .default_credentials(defaults())
        .output_order(order)
        .handler("echo", from_fn(|params, _| async move { Ok(Value::Object(params)) }))
        .handler(
            "slow",
            from_fn(|_, _| async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(json!("slow"))
            }),
        )
        .handler("fast", from_fn(|_, _| async move { Ok(json!("fast")) }))
        .handler(
            "whoami",
            from_fn(|_, credentials: Credentials| async move { Ok(json!(credentials.username)) }),
        )
        .build()
        .unwrap()
}

async fn run_lines(server: &StdioServer, input: &str) -> Vec<Value> {
    let (writer, mut output) = tokio::io::duplex(1 << 16);
    server.serve(input.as_bytes(), writer).await.unwrap();

    let mut text = String::new();
    output.read_to_string(&mut text).await.unwrap();
    assert!(text.is_empty() || text.ends_with('\n'));
    text.lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_invalid_json_line() {
    let out = run_lines(&server(OutputOrder::Completion), "not-json\n").await;

    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["jsonrpc"], "2.0");
    assert_eq!(out[0]["id"], Value::Null);
    assert_eq!(out[0]["error"]["code"], -32700);
    assert_eq!(out[0]["error"]["message"], "Parse error");
    assert!(out[0]["error"]["data"].as_str().is_some_and(|d| !d.is_empty()));
}

#[tokio::test]
async fn test_version_mismatch() {
    let out = run_lines(
        &server(OutputOrder::Completion),
        r#"{"jsonrpc":"1.0","id":1,"method":"echo"}"#,
    )
    .await;

    assert_eq!(
        out,
        vec![json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": {"code": -32700, "message": "Parse error", "data": "Invalid JSON-RPC version"}
        })]
    );
}

#[tokio::test]
async fn test_blank_line_is_answered() {
    let out = run_lines(&server(OutputOrder::Completion), "\n").await;

    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["error"]["code"], -32700);
}

#[tokio::test]
async fn test_unknown_method() {
    let out = run_lines(
        &server(OutputOrder::Completion),
        r#"{"jsonrpc":"2.0","id":3,"method":"delete_post","params":{}}"#,
    )
    .await;

    assert_eq!(
        out,
        vec![json!({
            "jsonrpc": "2.0",
            "id": 3,
            "error": {"code": -32000, "message": "Unknown method: delete_post"}
        })]
    );
}

#[tokio::test]
async fn test_ids_are_echoed_verbatim() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":"abc-1","method":"fast"}"#, "\n",
        r#"{"jsonrpc":"2.0","id":7,"method":"fast"}"#, "\n",
        r#"{"jsonrpc":"2.0","id":null,"method":"fast"}"#, "\n",
    );
    let out = run_lines(&server(OutputOrder::Arrival), input).await;

    let ids: Vec<Value> = out.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!("abc-1"), json!(7), Value::Null]);
    assert!(out.iter().all(|r| r["result"] == "fast" && r.get("error").is_none()));
}

#[tokio::test]
async fn test_missing_credentials() {
    let server = StdioServer::builder()
        .handler("whoami", from_fn(|_, _| async { Ok(Value::Null) }))
        .build()
        .unwrap();

    let out = run_lines(
        &server,
        r#"{"jsonrpc":"2.0","id":1,"method":"whoami","params":{"siteUrl":"https://a.example"}}"#,
    )
    .await;

    assert_eq!(out[0]["error"]["code"], -32000);
    assert_eq!(
        out[0]["error"]["message"],
        "WordPress credentials not provided in environment variables or request parameters"
    );
}

#[tokio::test]
async fn test_request_credentials_override_defaults() {
    let out = run_lines(
        &server(OutputOrder::Completion),
        r#"{"jsonrpc":"2.0","id":1,"method":"whoami","params":{"username":"editor"}}"#,
    )
    .await;

    assert_eq!(out[0]["result"], "editor");
}

#[tokio::test]
async fn test_completion_order_lets_fast_overtake_slow() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":"slow","method":"slow"}"#, "\n",
        r#"{"jsonrpc":"2.0","id":"fast","method":"fast"}"#, "\n",
    );
    let out = run_lines(&server(OutputOrder::Completion), input).await;

    assert_eq!(out.len(), 2);
    assert_eq!(out[0]["id"], "fast");
    assert_eq!(out[1]["id"], "slow");
    assert_eq!(out[1]["result"], "slow");
}

#[tokio::test]
async fn test_arrival_order_preserves_input_order() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":"slow","method":"slow"}"#, "\n",
        r#"{"jsonrpc":"2.0","id":"fast","method":"fast"}"#, "\n",
        "garbage\n",
    );
    let out = run_lines(&server(OutputOrder::Arrival), input).await;

    let ids: Vec<Value> = out.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!("slow"), json!("fast"), Value::Null]);
}

#[tokio::test]
async fn test_requests_run_concurrently() {
    // Both handlers wait for each other, so sequential dispatch would hang.
    let barrier = Arc::new(Barrier::new(2));
    let server = StdioServer::builder()
        .default_credentials(defaults())
        .handler(
            "meet",
            from_fn(move |_, _| {
                let barrier = Arc::clone(&barrier);
                async move {
                    barrier.wait().await;
                    Ok(json!(true))
                }
            }),
        )
        .build()
        .unwrap();

    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"meet"}"#, "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"meet"}"#, "\n",
    );
    let out = tokio::time::timeout(Duration::from_secs(5), run_lines(&server, input))
        .await
        .expect("requests did not run concurrently");

    assert_eq!(out.len(), 2);
}

#[tokio::test]
async fn test_one_response_per_line_and_drain_on_eof() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"slow"}"#, "\n",
        "{broken\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"echo","params":{"a":1}}"#, "\n",
        r#"{"jsonrpc":"2.0","id":3,"method":"nope"}"#, "\n",
        r#"{"jsonrpc":"2.0","id":4,"method":"slow"}"#,
    );
    let out = run_lines(&server(OutputOrder::Completion), input).await;

    assert_eq!(out.len(), 5);
    let mut ids: Vec<String> = out.iter().map(|r| r["id"].to_string()).collect();
    ids.sort();
    assert_eq!(ids, vec!["1", "2", "3", "4", "null"]);

    let echo = out.iter().find(|r| r["id"] == 2).unwrap();
    assert_eq!(echo["result"], json!({"a": 1}));
}

#[tokio::test]
async fn test_shutdown_stops_without_end_of_input() {
    let server = server(OutputOrder::Completion);
    let (mut input, server_in) = tokio::io::duplex(1024);
    let (server_out, mut output) = tokio::io::duplex(1024);

    input
        .write_all(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"fast\"}\n")
        .await
        .unwrap();

    let shutdown = tokio::time::sleep(Duration::from_millis(100));
    server
        .serve_with_shutdown(server_in, server_out, shutdown)
        .await
        .unwrap();

    let mut text = String::new();
    output.read_to_string(&mut text).await.unwrap();
    assert!(text.contains("\"result\":\"fast\""));
    drop(input);
}
