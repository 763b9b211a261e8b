//! Wire-level tests against an in-process HTTP server.
//!
//! Verifies the liveness probe, the request line, and the auth header.

use super::common::FakeServer;
use ch_glance::config::EndpointConfig;
use ch_glance::db::{self, Value};
use ch_glance::error::ClientError;

fn endpoint(port: u16) -> EndpointConfig {
    EndpointConfig {
        host: Some("127.0.0.1".to_string()),
        port,
        database: Some("analytics".to_string()),
        timeout_secs: 5,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_connect_probes_root() {
    let server = FakeServer::start(vec![(200, "Ok.\n")]).await;

    db::connect(&endpoint(server.port)).await.unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].target, "/");
}

#[tokio::test]
async fn test_connect_fails_on_non_200_probe() {
    let server = FakeServer::start(vec![(503, "unavailable")]).await;

    let err = db::connect(&endpoint(server.port)).await.unwrap_err();
    match err {
        ClientError::Connect(msg) => assert!(msg.contains("503"), "got: {msg}"),
        other => panic!("Expected Connect error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connect_without_database_fails_before_network() {
    let server = FakeServer::start(vec![]).await;
    let config = EndpointConfig {
        database: None,
        ..endpoint(server.port)
    };

    let err = db::connect(&config).await.unwrap_err();
    assert!(matches!(err, ClientError::Config(_)));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_query_request_line() {
    let server = FakeServer::start(vec![
        (200, "Ok.\n"),
        (
            200,
            r#"{"meta":[{"name":"id","type":"UInt32"}],"data":[[1],[2]],"rows":2}"#,
        ),
    ])
    .await;

    let client = db::connect(&endpoint(server.port)).await.unwrap();
    let result = client.query("SELECT 1").await.unwrap();
    assert_eq!(result.rows, vec![vec![Value::Int(1)], vec![Value::Int(2)]]);

    let request = &server.requests()[1];
    assert_eq!(request.method, "POST");
    assert_eq!(
        request.target,
        "/?database=analytics&query=SELECT+1+FORMAT+JSONCompact&output_format_write_statistics=1"
    );
    assert_eq!(request.header("authorization"), None);
}

#[tokio::test]
async fn test_password_only_uses_default_user() {
    let server = FakeServer::start(vec![(200, "Ok.\n"), (200, "")]).await;
    let config = EndpointConfig {
        password: Some("secret".to_string()),
        ..endpoint(server.port)
    };

    let client = db::connect(&config).await.unwrap();
    client.insert("INSERT INTO t DEFAULT VALUES").await.unwrap();

    for request in server.requests() {
        assert_eq!(
            request.header("authorization"),
            Some("Basic ZGVmYXVsdDpzZWNyZXQ=")
        );
    }
}

#[tokio::test]
async fn test_insert_body_is_posted() {
    let server = FakeServer::start(vec![(200, "Ok.\n"), (200, "")]).await;

    let client = db::connect(&endpoint(server.port)).await.unwrap();
    client
        .insert_with_body("INSERT INTO events FORMAT JSONEachRow", "{\"id\":1}\n")
        .await
        .unwrap();

    let request = &server.requests()[1];
    assert_eq!(request.method, "POST");
    assert_eq!(request.body, "{\"id\":1}\n");
    assert!(request
        .target
        .contains("query=INSERT+INTO+events+FORMAT+JSONEachRow&"));
}

#[tokio::test]
async fn test_server_error_body_is_surfaced() {
    let server = FakeServer::start(vec![
        (200, "Ok.\n"),
        (404, "Code: 60. DB::Exception: Table analytics.nope does not exist."),
    ])
    .await;

    let client = db::connect(&endpoint(server.port)).await.unwrap();
    match client.describe_table("nope").await {
        Err(ClientError::Http { status, body }) => {
            assert_eq!(status, 404);
            assert!(body.contains("does not exist"));
        }
        other => panic!("Expected Http error, got {:?}", other),
    }
}
