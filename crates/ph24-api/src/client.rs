//! PH24 Cloud REST client
//!
//! One method per endpoint. Calls never fail for remote outcomes; they
//! return an [`ApiResponse`] the caller inspects by status code.

use crate::action::ServerAction;
use crate::error::{ApiError, Result};
use crate::models::{
    CreateServerRequest, NamedResourceRequest, ServerActionRequest, UpdateServerRequest,
};
use crate::response::ApiResponse;
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

pub const DEFAULT_API_URL: &str = "https://ph24.io/service";

/// Authentication header carrying the bare key
///
/// HTTP/1 writes it title-cased with the standard separator, so the wire
/// line is `Ph24-Api-Key: <key>`. Header names are case-insensitive.
pub const API_KEY_HEADER: &str = "PH24-API-KEY";

/// PH24 Cloud API client
#[derive(Debug, Clone)]
pub struct Ph24Client {
    client: reqwest::Client,
    base_url: String,
}

impl Ph24Client {
    /// Create a client for `api_url` (defaults to [`DEFAULT_API_URL`] when
    /// `None` or blank). Requests have no timeout.
    pub fn new(api_key: &str, api_url: Option<&str>) -> Result<Self> {
        Self::with_builder(api_key, api_url, reqwest::Client::builder())
    }

    /// Like [`Ph24Client::new`] on top of a caller-configured transport
    /// such as one with a timeout. Default headers are added to `builder`.
    pub fn with_builder(
        api_key: &str,
        api_url: Option<&str>,
        builder: reqwest::ClientBuilder,
    ) -> Result<Self> {
        let base_url = api_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string();

        reqwest::Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

        let mut key = HeaderValue::from_str(api_key).map_err(|_| ApiError::InvalidApiKey)?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("ph24-api-key"), key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = builder
            .default_headers(headers)
            .http1_title_case_headers()
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute a request and normalize the outcome
    async fn request<B: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> ApiResponse {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!("{} {}", method, url);

        let carries_body = matches!(method, Method::POST | Method::PUT | Method::PATCH);
        let mut request = self.client.request(method, &url);

        if carries_body {
            if let Some(body) = body {
                match serde_json::to_string(body) {
                    Ok(json) => request = request.body(json),
                    Err(e) => {
                        return ApiResponse::transport_error(format!(
                            "request body could not be encoded: {}",
                            e
                        ));
                    }
                }
            }
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Request to {} failed: {}", url, e);
                return ApiResponse::transport_error(e.to_string());
            }
        };

        let code = response.status().as_u16();
        match response.text().await {
            Ok(text) => {
                tracing::debug!("{} -> {}", url, code);
                ApiResponse::from_body(code, &text)
            }
            Err(e) => {
                tracing::warn!("Reading response from {} failed: {}", url, e);
                ApiResponse::transport_error(e.to_string())
            }
        }
    }

    async fn get(&self, endpoint: &str) -> ApiResponse {
        self.request::<()>(Method::GET, endpoint, None).await
    }

    async fn delete(&self, endpoint: &str) -> ApiResponse {
        self.request::<()>(Method::DELETE, endpoint, None).await
    }

    // ========== Cloud ==========

    /// Account-level cloud information; used as a credentials check
    pub async fn info(&self) -> ApiResponse {
        self.get("/v1/cloud/info").await
    }

    pub async fn availability_zones(&self) -> ApiResponse {
        self.get("/v1/cloud/availability-zones").await
    }

    pub async fn flavors(&self) -> ApiResponse {
        self.get("/v1/cloud/instance/flavor").await
    }

    /// `true` when the info endpoint answers with 2xx
    pub async fn validate_connection(&self) -> bool {
        self.info().await.is_success()
    }

    // ========== Projects ==========

    pub async fn projects(&self) -> ApiResponse {
        self.get("/v1/cloud/project").await
    }

    pub async fn create_project(&self, name: &str) -> ApiResponse {
        let body = NamedResourceRequest {
            name: name.to_string(),
        };
        self.request(Method::POST, "/v1/cloud/project", Some(&body))
            .await
    }

    pub async fn project(&self, project_id: &str) -> ApiResponse {
        self.get(&format!("/v1/cloud/project/{}", project_id)).await
    }

    pub async fn delete_project(&self, project_id: &str) -> ApiResponse {
        self.delete(&format!("/v1/cloud/project/{}", project_id))
            .await
    }

    pub async fn project_images(&self, project_id: &str) -> ApiResponse {
        self.get(&format!("/v1/cloud/project/{}/image", project_id))
            .await
    }

    // ========== Networks / Firewalls ==========

    pub async fn networks(&self, project_id: &str) -> ApiResponse {
        self.get(&format!("/v1/cloud/project/{}/network", project_id))
            .await
    }

    pub async fn create_network(&self, project_id: &str, name: &str) -> ApiResponse {
        let body = NamedResourceRequest {
            name: name.to_string(),
        };
        self.request(
            Method::POST,
            &format!("/v1/cloud/project/{}/network", project_id),
            Some(&body),
        )
        .await
    }

    pub async fn firewalls(&self, project_id: &str) -> ApiResponse {
        self.get(&format!("/v1/cloud/project/{}/firewall", project_id))
            .await
    }

    pub async fn create_firewall(&self, project_id: &str, name: &str) -> ApiResponse {
        let body = NamedResourceRequest {
            name: name.to_string(),
        };
        self.request(
            Method::POST,
            &format!("/v1/cloud/project/{}/firewall", project_id),
            Some(&body),
        )
        .await
    }

    // ========== Servers ==========

    pub async fn servers(&self, project_id: &str) -> ApiResponse {
        self.get(&format!("/v1/cloud/project/{}/server", project_id))
            .await
    }

    pub async fn server(&self, project_id: &str, server_id: &str) -> ApiResponse {
        self.get(&format!(
            "/v1/cloud/project/{}/server/{}",
            project_id, server_id
        ))
        .await
    }

    pub async fn create_server(&self, project_id: &str, params: &CreateServerRequest) -> ApiResponse {
        self.request(
            Method::POST,
            &format!("/v1/cloud/project/{}/server", project_id),
            Some(params),
        )
        .await
    }

    pub async fn update_server(
        &self,
        project_id: &str,
        server_id: &str,
        params: &UpdateServerRequest,
    ) -> ApiResponse {
        self.request(
            Method::PUT,
            &format!("/v1/cloud/project/{}/server/{}", project_id, server_id),
            Some(params),
        )
        .await
    }

    pub async fn delete_server(&self, project_id: &str, server_id: &str) -> ApiResponse {
        self.delete(&format!(
            "/v1/cloud/project/{}/server/{}",
            project_id, server_id
        ))
        .await
    }

    /// Perform a power/lifecycle action. `flavor_id` is only meaningful for
    /// [`ServerAction::Rescale`].
    pub async fn server_action(
        &self,
        project_id: &str,
        server_id: &str,
        action: ServerAction,
        flavor_id: Option<&str>,
    ) -> ApiResponse {
        let body = ServerActionRequest {
            action,
            flavor_id: flavor_id.map(str::to_string),
        };
        self.request(
            Method::POST,
            &format!(
                "/v1/cloud/project/{}/server/{}/action",
                project_id, server_id
            ),
            Some(&body),
        )
        .await
    }

    pub async fn server_console(&self, project_id: &str, server_id: &str) -> ApiResponse {
        self.get(&format!(
            "/v1/cloud/project/{}/server/{}/console",
            project_id, server_id
        ))
        .await
    }

    pub async fn server_logs(&self, project_id: &str, server_id: &str) -> ApiResponse {
        self.get(&format!(
            "/v1/cloud/project/{}/server/{}/log",
            project_id, server_id
        ))
        .await
    }

    pub async fn server_network_ports(&self, project_id: &str, server_id: &str) -> ApiResponse {
        self.get(&format!(
            "/v1/cloud/project/{}/server/{}/network-port",
            project_id, server_id
        ))
        .await
    }

    // ========== VPS catalog ==========

    pub async fn plans(&self) -> ApiResponse {
        self.get("/v1/vps/plans").await
    }

    pub async fn images(&self) -> ApiResponse {
        self.get("/v1/vps/images").await
    }

    pub async fn addons(&self) -> ApiResponse {
        self.get("/v1/vps/addons").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_url() {
        let client = Ph24Client::new("ph24_test", None).unwrap();
        assert_eq!(client.base_url(), DEFAULT_API_URL);

        let client = Ph24Client::new("ph24_test", Some("  ")).unwrap();
        assert_eq!(client.base_url(), DEFAULT_API_URL);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = Ph24Client::new("ph24_test", Some("https://api.example.com/service/")).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com/service");
    }

    #[test]
    fn test_invalid_key_rejected() {
        let result = Ph24Client::new("bad\nkey", None);
        assert!(matches!(result, Err(ApiError::InvalidApiKey)));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = Ph24Client::new("ph24_test", Some("not a url"));
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }
}
