#![allow(deprecated)] // TODO: move from cargo_bin to cargo_bin_cmd!

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "ph24_test_key";

/// Binary wired to a mock API, an explicit config file and a private state dir
fn ph24(dir: &Path, api_url: &str) -> Command {
    let config = dir.join("ph24.yaml");
    std::fs::write(
        &config,
        "use_master_project: true\nmaster_project_id: p-master\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("ph24").unwrap();
    cmd.env("PH24_CONFIG_PATH", &config)
        .env("PH24_API_URL", api_url)
        .env("PH24_API_KEY", API_KEY)
        .env("PH24_STATE_DIR", dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

async fn run(mut cmd: Command) -> assert_cmd::assert::Assert {
    tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap()
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("ph24").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("PH24 Cloud"))
        .stdout(predicate::str::contains("provision"))
        .stdout(predicate::str::contains("suspend"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("ph24").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ph24"));
}

#[test]
fn test_provision_help() {
    let mut cmd = Command::cargo_bin("ph24").unwrap();
    cmd.arg("provision")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("<CLIENT_ID>"))
        .stdout(predicate::str::contains("--image"))
        .stdout(predicate::str::contains("--flavor"));
}

#[test]
fn test_unknown_action_is_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut cmd = ph24(temp_dir.path(), "http://127.0.0.1:1");
    cmd.args(["action", "p-1", "s-1", "hibernate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HIBERNATE"));
}

#[test]
fn test_invalid_hostname_fails_before_any_call() {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut cmd = ph24(temp_dir.path(), "http://127.0.0.1:1");
    cmd.args([
        "provision", "42", "web_01", "--image", "img-1", "--flavor", "vc2-2c-4gb",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("valid domain name"));

    assert!(!temp_dir.path().join(".ph24/state.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_provision_then_suspend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/cloud/project/p-master/network"))
        .and(header("PH24-API-KEY", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "n-1"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/cloud/project/p-master/firewall"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "f-1"}])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/cloud/project/p-master/server"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "s-1",
            "ipAddresses": ["10.0.0.5"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/cloud/project/p-master/server/s-1/action"))
        .and(body_json(json!({"action": "STOP"})))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = tempfile::tempdir().unwrap();

    let mut cmd = ph24(temp_dir.path(), &server.uri());
    cmd.args([
        "provision",
        "42",
        "web-01.example.com",
        "--image",
        "img-1",
        "--flavor",
        "vc2-2c-4gb",
    ]);
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Service 1 active"));

    let mut cmd = ph24(temp_dir.path(), &server.uri());
    cmd.args(["suspend", "1"]);
    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("suspended"));

    let state: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(temp_dir.path().join(".ph24/state.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(state["services"]["1"]["status"], "suspended");
    assert_eq!(state["services"]["1"]["client_id"], "42");
    let endpoints: Vec<&str> = state["log"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry["endpoint"].as_str())
        .collect();
    assert!(endpoints.iter().any(|e| e.ends_with("|server-create")));
    assert!(endpoints.iter().any(|e| e.ends_with("|server-action-stop")));
}

async fn mount_master_project(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/cloud/project/p-master/network"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "n-1"}])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/cloud/project/p-master/firewall"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "f-1"}])))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/cloud/project/p-master/server"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "s-1"})))
        .mount(server)
        .await;
}

fn read_state(dir: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(dir.join(".ph24/state.json")).unwrap())
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_delete_still_cancels_service() {
    let server = MockServer::start().await;
    mount_master_project(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/v1/cloud/project/p-master/server/s-1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "busy"})))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let mut cmd = ph24(temp_dir.path(), &server.uri());
    cmd.args([
        "provision", "42", "web-01.example.com", "--image", "img-1", "--flavor", "vc2-2c-4gb",
    ]);
    run(cmd).await.success();

    let mut cmd = ph24(temp_dir.path(), &server.uri());
    cmd.args(["cancel", "1"]);
    run(cmd)
        .await
        .failure()
        .stderr(predicate::str::contains("Failed to delete server: busy"));

    let state = read_state(temp_dir.path());
    assert_eq!(state["services"]["1"]["status"], "canceled");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_root_password_is_not_stored_in_clear() {
    let server = MockServer::start().await;
    mount_master_project(&server).await;

    let temp_dir = tempfile::tempdir().unwrap();
    let mut cmd = ph24(temp_dir.path(), &server.uri());
    cmd.args([
        "provision", "42", "web-01.example.com", "--image", "img-1", "--flavor", "vc2-2c-4gb",
    ]);
    run(cmd).await.success();

    let state = read_state(temp_dir.path());
    let password = state["services"]["1"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|field| field["key"] == "password")
        .unwrap();
    assert_eq!(password["encrypted"], true);
    // nonce + ciphertext + tag of a 16 character password, base64 encoded
    assert_eq!(password["value"].as_str().unwrap().len(), 60);
    assert!(temp_dir.path().join(".ph24/state.key").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_suspend_unknown_service() {
    let server = MockServer::start().await;
    let temp_dir = tempfile::tempdir().unwrap();

    let mut cmd = ph24(temp_dir.path(), &server.uri());
    cmd.args(["suspend", "9"]);
    run(cmd)
        .await
        .failure()
        .stderr(predicate::str::contains("Service '9' not found"));

    assert!(server.received_requests().await.unwrap().is_empty());
}
