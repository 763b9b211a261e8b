//! Binary tests.
//!
//! Runs the built `ch-glance` binary against the fake server.

use super::common::FakeServer;
use std::process::Command;

fn run_cli(args: Vec<String>) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_ch-glance"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("CLICKHOUSE_PASSWORD")
        .output()
        .expect("Failed to execute command");

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}

fn base_args(port: u16, config: &std::path::Path) -> Vec<String> {
    vec![
        "--config".to_string(),
        config.display().to_string(),
        "--url".to_string(),
        format!("http://127.0.0.1:{port}/analytics"),
    ]
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_lists_tables() {
    let server = FakeServer::start(vec![
        (200, "Ok.\n"),
        (
            200,
            r#"{"meta":[{"name":"name","type":"String"}],"data":[["events"],["users"]]}"#,
        ),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();

    let mut args = base_args(server.port, &dir.path().join("config.toml"));
    args.push("tables".to_string());

    let (code, stdout, stderr) = tokio::task::spawn_blocking(move || run_cli(args))
        .await
        .unwrap();

    assert_eq!(code, 0, "stderr: {stderr}");
    assert_eq!(stdout, "events\nusers\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_query_as_json() {
    let server = FakeServer::start(vec![
        (200, "Ok.\n"),
        (200, r#"{"meta":[{"name":"x","type":"UInt8"}],"data":[[7]]}"#),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();

    let mut args = base_args(server.port, &dir.path().join("config.toml"));
    args.extend(["--json", "query", "SELECT 7 AS x"].map(String::from));

    let (code, stdout, stderr) = tokio::task::spawn_blocking(move || run_cli(args))
        .await
        .unwrap();

    assert_eq!(code, 0, "stderr: {stderr}");
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["rows"], serde_json::json!([[7]]));
}

#[test]
fn test_cli_rejects_unknown_config_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[connections.default]\nhots = \"localhost\"\n").unwrap();

    let (code, _stdout, stderr) = run_cli(
        ["--config", path.to_str().unwrap(), "tables"]
            .map(String::from)
            .to_vec(),
    );

    assert_eq!(code, 1);
    assert!(stderr.contains("Configuration Error"), "stderr: {stderr}");
}

#[test]
fn test_cli_rejects_non_http_url() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let (code, _stdout, stderr) = run_cli(
        [
            "--config",
            path.to_str().unwrap(),
            "--url",
            "postgres://localhost/db",
            "tables",
        ]
        .map(String::from)
        .to_vec(),
    );

    assert_eq!(code, 1);
    assert!(stderr.contains("Invalid scheme"), "stderr: {stderr}");
}
