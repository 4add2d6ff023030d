mod common;

use common::{MemoryHost, TestModule, provisioned_service};
use ph24_module::{ClientActionRequest, PowerStatus, ProvisioningModule, Service};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

const SERVER_PATH: &str = "/v1/cloud/project/p-42/server/s-1";

async fn mount_server(t: &TestModule, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(SERVER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&t.server)
        .await;
}

fn action(name: &str) -> ClientActionRequest {
    ClientActionRequest {
        action: name.to_string(),
        new_hostname: None,
    }
}

fn rename(hostname: &str) -> ClientActionRequest {
    ClientActionRequest {
        action: "CHANGE_HOSTNAME".to_string(),
        new_hostname: Some(hostname.to_string()),
    }
}

#[tokio::test]
async fn test_overview_classifies_live_status() {
    let t = TestModule::start().await;
    mount_server(
        &t,
        json!({"id": "s-1", "status": "provisioning", "powerState": "RUNNING"}),
    )
    .await;

    let overview = t
        .module
        .client_actions(Some(&t.row), &provisioned_service(), None)
        .await;

    assert_eq!(overview.message, None);
    assert_eq!(overview.server_status, Some(PowerStatus::Unknown));
    assert_eq!(overview.power_state.as_deref(), Some("RUNNING"));
    assert_eq!(overview.hostname.as_deref(), Some("web-01.example.com"));
}

#[tokio::test]
async fn test_overview_without_row() {
    let t = TestModule::start().await;

    let overview = t
        .module
        .client_actions(None, &provisioned_service(), None)
        .await;

    assert!(overview.message.is_some());
    assert!(overview.server.is_none());
    assert!(t.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_overview_without_server_ids() {
    let t = TestModule::start().await;
    let service = Service {
        id: "100".to_string(),
        client_id: "42".to_string(),
        ..Default::default()
    };

    let overview = t
        .module
        .client_actions(Some(&t.row), &service, Some(&action("STOP")))
        .await;

    assert_eq!(
        overview.message.as_deref(),
        Some("Server details not found for this service.")
    );
    assert!(t.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_status_unavailable() {
    let t = TestModule::start().await;
    Mock::given(method("GET"))
        .and(path(SERVER_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&t.server)
        .await;

    let overview = t
        .module
        .client_actions(Some(&t.row), &provisioned_service(), None)
        .await;

    assert_eq!(
        overview.message.as_deref(),
        Some("Unable to retrieve server status at this time.")
    );
    assert!(overview.server_status.is_none());
}

#[tokio::test]
async fn test_power_action_then_refresh() {
    let t = TestModule::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/action", SERVER_PATH)))
        .and(body_json(json!({"action": "FORCE_REBOOT"})))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&t.server)
        .await;
    mount_server(&t, json!({"id": "s-1", "status": "ACTIVE"})).await;

    let overview = t
        .module
        .client_actions(Some(&t.row), &provisioned_service(), Some(&action("force_reboot")))
        .await;

    assert_eq!(
        overview.message.as_deref(),
        Some("Action FORCE_REBOOT accepted.")
    );
    assert_eq!(overview.server_status, Some(PowerStatus::Running));
}

#[tokio::test]
async fn test_power_action_failure_shows_remote_message() {
    let t = TestModule::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/action", SERVER_PATH)))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "Server is locked"})),
        )
        .mount(&t.server)
        .await;
    mount_server(&t, json!({"id": "s-1", "status": "STOPPED"})).await;

    let overview = t
        .module
        .client_actions(Some(&t.row), &provisioned_service(), Some(&action("START")))
        .await;

    assert_eq!(
        overview.message.as_deref(),
        Some("Action START failed. Server is locked")
    );
    assert_eq!(overview.server_status, Some(PowerStatus::Off));
}

#[tokio::test]
async fn test_unsupported_action_is_not_forwarded() {
    let t = TestModule::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/action", SERVER_PATH)))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&t.server)
        .await;
    mount_server(&t, json!({"id": "s-1", "status": "ACTIVE"})).await;

    let overview = t
        .module
        .client_actions(Some(&t.row), &provisioned_service(), Some(&action("REBUILD")))
        .await;

    assert_eq!(
        overview.message.as_deref(),
        Some("Action REBUILD failed. Unsupported action.")
    );
}

#[tokio::test]
async fn test_change_hostname_requires_value() {
    let t = TestModule::start().await;
    Mock::given(method("PUT"))
        .and(path(SERVER_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&t.server)
        .await;
    mount_server(&t, json!({"id": "s-1", "status": "ACTIVE"})).await;

    let overview = t
        .module
        .client_actions(Some(&t.row), &provisioned_service(), Some(&rename("   ")))
        .await;

    assert_eq!(overview.message.as_deref(), Some("Please enter a hostname."));
    assert_eq!(overview.hostname.as_deref(), Some("web-01.example.com"));
}

#[tokio::test]
async fn test_change_hostname_updates_and_persists() {
    let t = TestModule::start().await;
    Mock::given(method("PUT"))
        .and(path(SERVER_PATH))
        .and(body_json(json!({"name": "web-02.example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "s-1"})))
        .expect(1)
        .mount(&t.server)
        .await;
    mount_server(&t, json!({"id": "s-1", "name": "web-02.example.com"})).await;

    let overview = t
        .module
        .client_actions(
            Some(&t.row),
            &provisioned_service(),
            Some(&rename("web-02.example.com")),
        )
        .await;

    assert_eq!(overview.message.as_deref(), Some("Hostname updated."));
    assert_eq!(overview.hostname.as_deref(), Some("web-02.example.com"));

    let stored = t.module.host().service_fields.lock().unwrap();
    assert_eq!(stored["100"].get("hostname"), Some("web-02.example.com"));
}

#[tokio::test]
async fn test_hostname_persistence_failure_is_swallowed() {
    let t = TestModule::with_host(MemoryHost {
        fail_service_writes: true,
        ..Default::default()
    })
    .await;
    Mock::given(method("PUT"))
        .and(path(SERVER_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&t.server)
        .await;
    mount_server(&t, json!({"id": "s-1"})).await;

    let overview = t
        .module
        .client_actions(
            Some(&t.row),
            &provisioned_service(),
            Some(&rename("web-02.example.com")),
        )
        .await;

    assert_eq!(overview.message.as_deref(), Some("Hostname updated."));
}

#[tokio::test]
async fn test_change_hostname_remote_failure() {
    let t = TestModule::start().await;
    Mock::given(method("PUT"))
        .and(path(SERVER_PATH))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "Name already taken"})),
        )
        .mount(&t.server)
        .await;
    mount_server(&t, json!({"id": "s-1"})).await;

    let overview = t
        .module
        .client_actions(
            Some(&t.row),
            &provisioned_service(),
            Some(&rename("web-02.example.com")),
        )
        .await;

    assert_eq!(
        overview.message.as_deref(),
        Some("Failed to update hostname. Name already taken")
    );
    assert!(t.module.host().service_fields.lock().unwrap().is_empty());
}
