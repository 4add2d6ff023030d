use ph24_api::Ph24Client;
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "ph24_test_key";

pub struct TestApi {
    pub server: MockServer,
    pub client: Ph24Client,
}

impl TestApi {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let client = Ph24Client::new(TEST_API_KEY, Some(&server.uri())).unwrap();
        Self { server, client }
    }
}
