mod common;

use common::{TestModule, package, provisioned_service};
use ph24_module::{ErrorKind, LogDirection, ModuleError, ProvisioningModule, Service};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_cancel_without_server_is_a_no_op() {
    let t = TestModule::start().await;
    let service = Service {
        id: "100".to_string(),
        client_id: "42".to_string(),
        ..Default::default()
    };

    let result = t.module.cancel_service(&t.row, &package(), &service).await;

    assert!(matches!(result, Ok(None)));
    assert!(t.server.received_requests().await.unwrap().is_empty());
    assert!(t.module.host().logs().is_empty());
}

#[tokio::test]
async fn test_cancel_deletes_server() {
    let t = TestModule::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/cloud/project/p-42/server/s-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&t.server)
        .await;

    t.module
        .cancel_service(&t.row, &package(), &provisioned_service())
        .await
        .unwrap();

    let logs = t.module.host().logs();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].endpoint, format!("{}|server-delete", t.server.uri()));
    assert_eq!(logs[0].direction, LogDirection::Input);
    assert!(logs[0].payload.contains("\"server_id\":\"s-1\""));
    assert!(logs[1].success);
}

#[tokio::test]
async fn test_cancel_failure_is_reported() {
    let t = TestModule::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/cloud/project/p-42/server/s-1"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "Server is locked"})),
        )
        .mount(&t.server)
        .await;

    let err = t
        .module
        .cancel_service(&t.row, &package(), &provisioned_service())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to delete server: Server is locked");
    assert!(!t.module.host().logs()[1].success);
}

#[tokio::test]
async fn test_suspend_stops_server() {
    let t = TestModule::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/cloud/project/p-42/server/s-1/action"))
        .and(body_json(json!({"action": "STOP"})))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"accepted": true})))
        .expect(1)
        .mount(&t.server)
        .await;

    t.module
        .suspend_service(&t.row, &package(), &provisioned_service())
        .await
        .unwrap();

    let logs = t.module.host().logs();
    assert_eq!(
        logs[0].endpoint,
        format!("{}|server-action-stop", t.server.uri())
    );
}

#[tokio::test]
async fn test_unsuspend_starts_server() {
    let t = TestModule::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/cloud/project/p-42/server/s-1/action"))
        .and(body_json(json!({"action": "START"})))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&t.server)
        .await;

    t.module
        .unsuspend_service(&t.row, &package(), &provisioned_service())
        .await
        .unwrap();

    let logs = t.module.host().logs();
    assert_eq!(
        logs[1].endpoint,
        format!("{}|server-action-start", t.server.uri())
    );
}

#[tokio::test]
async fn test_suspend_failure_message() {
    let t = TestModule::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/cloud/project/p-42/server/s-1/action"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream timeout"))
        .mount(&t.server)
        .await;

    let err = t
        .module
        .suspend_service(&t.row, &package(), &provisioned_service())
        .await
        .unwrap_err();

    assert!(matches!(err, ModuleError::ServerSuspend(_)));
    assert_eq!(
        err.to_string(),
        "Failed to suspend server (response: upstream timeout)"
    );
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[tokio::test]
async fn test_unreachable_api_is_a_transport_failure() {
    let mut t = TestModule::start().await;
    t.row.meta.api_url = "http://127.0.0.1:1".to_string();

    let err = t
        .module
        .unsuspend_service(&t.row, &package(), &provisioned_service())
        .await
        .unwrap_err();

    assert!(matches!(err, ModuleError::ServerUnsuspend(_)));
    assert_eq!(err.kind(), ErrorKind::Transport);
}
