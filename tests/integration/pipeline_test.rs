//! Statement pipeline tests over the mock transport.
//!
//! Exercises the public API end to end without a server.

use ch_glance::db::{ClickhouseClient, MockTransport, OutputFormat, Response, Statement, Value};
use ch_glance::error::ClientError;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_raw_statement_passthrough() {
    let create = "CREATE TABLE analytics.events\n(\n    `id` UInt64\n)\nENGINE = MergeTree\nORDER BY id";
    let client = ClickhouseClient::new(MockTransport::new("analytics").respond(200, create));

    let response = client
        .execute(Statement::raw("SHOW CREATE TABLE events"))
        .await
        .unwrap();

    assert_eq!(response, Response::Raw(create.to_string()));
    assert_eq!(
        client.transport().requests()[0].sql().as_deref(),
        Some("SHOW CREATE TABLE events")
    );
}

#[tokio::test]
async fn test_json_format_statement() {
    let client = ClickhouseClient::new(MockTransport::new("analytics").respond(
        200,
        r#"{"meta":[{"name":"n","type":"UInt64"}],"data":[{"n":"18446744073709551615"}],"rows":1}"#,
    ));

    let table = client
        .execute(Statement::query("SELECT toUInt64(-1) AS n").with_format(OutputFormat::Json))
        .await
        .unwrap()
        .into_table()
        .unwrap();

    assert_eq!(
        table.rows,
        vec![vec![Value::String("18446744073709551615".to_string())]]
    );
    assert_eq!(
        client.transport().requests()[0].sql().as_deref(),
        Some("SELECT toUInt64(-1) AS n FORMAT JSON")
    );
}

#[tokio::test]
async fn test_ddl_yields_empty_result() {
    let client = ClickhouseClient::new(MockTransport::default().respond(200, ""));

    let result = client
        .query("CREATE TABLE t (id UInt32) ENGINE = Memory")
        .await
        .unwrap();

    assert!(result.columns.is_empty());
    assert!(result.rows.is_empty());
}

#[tokio::test]
async fn test_each_call_is_independent() {
    let client = ClickhouseClient::new(
        MockTransport::default()
            .respond(500, "boom")
            .respond(200, r#"{"meta":[{"name":"x","type":"UInt8"}],"data":[[1]]}"#),
    );

    assert!(matches!(
        client.query("SELECT x").await,
        Err(ClientError::Http { status: 500, .. })
    ));
    let result = client.query("SELECT x").await.unwrap();
    assert_eq!(result.rows, vec![vec![Value::Int(1)]]);
}

#[tokio::test]
async fn test_unsupported_operations_make_no_requests() {
    let client = ClickhouseClient::new(MockTransport::default());

    for result in [
        client.update("ALTER TABLE t UPDATE x = 1 WHERE 1").await,
        client.delete("ALTER TABLE t DELETE WHERE 1").await,
    ] {
        assert!(matches!(result, Err(ClientError::UnsupportedOperation(_))));
    }
    assert_eq!(client.transport().request_count(), 0);
}

#[tokio::test]
async fn test_describe_missing_table() {
    let client = ClickhouseClient::new(
        MockTransport::default().respond(200, r#"{"meta":[{"name":"name","type":"String"}],"data":[]}"#),
    );

    let err = client.describe_table("missing_table").await.unwrap_err();
    assert_eq!(err.to_string(), "Could not find table 'missing_table'");
}

#[tokio::test]
async fn test_malformed_json_surfaces_parse_error() {
    let client = ClickhouseClient::new(MockTransport::default().respond(200, "{\"meta\":"));

    let err = client.list_tables().await.unwrap_err();
    assert!(matches!(err, ClientError::Parse { .. }));
    assert_eq!(err.category(), "Parse Error");
}
