//! HTTP transport shared by the session and context clients

use agentbay_api_contract::{ApiResponse, ProblemDetails};
use reqwest::{Client as HttpClient, Method, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::auth::AuthConfig;
use crate::config::Config;
use crate::error::{AgentBayError, AgentBayResult};

/// Low-level client for the AgentBay REST API
///
/// One instance owns one connection pool; the session and context clients
/// share it behind an `Arc`.
#[derive(Debug)]
pub struct AgentBayClient {
    http_client: HttpClient,
    base_url: Url,
    auth: AuthConfig,
}

impl AgentBayClient {
    pub fn new(config: &Config) -> AgentBayResult<Self> {
        let http_client = HttpClient::builder()
            .user_agent(concat!("agentbay-sdk-rust/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        let base_url = Url::parse(&config.endpoint)?;

        Ok(Self {
            http_client,
            base_url,
            auth: AuthConfig::bearer(config.api_key.clone()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> AgentBayResult<ApiResponse<T>> {
        self.request(Method::GET, path, None::<&()>).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> AgentBayResult<ApiResponse<T>> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> AgentBayResult<ApiResponse<T>> {
        self.request(Method::POST, path, Some(&())).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> AgentBayResult<ApiResponse<T>> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> AgentBayResult<ApiResponse<T>> {
        self.request(Method::DELETE, path, None::<&()>).await
    }

    async fn request<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> AgentBayResult<ApiResponse<T>> {
        let url = self.base_url.join(path)?;
        tracing::debug!(method = %method, url = %url, "sending request");

        let mut request = self.http_client.request(method, url);
        request = request.headers(self.auth.headers()?);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Normalize a round trip into the shared envelope.
    ///
    /// Expected server rejections arrive as RFC 7807 problem bodies; they
    /// become `success == false` envelopes with the server's message text
    /// unmodified, so callers distinguish them from transport failures.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> AgentBayResult<ApiResponse<T>> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            let envelope: ApiResponse<T> = serde_json::from_str(&text)?;
            tracing::debug!(
                request_id = %envelope.request_id,
                success = envelope.success,
                "received response"
            );
            return Ok(envelope);
        }

        match serde_json::from_str::<ProblemDetails>(&text) {
            Ok(problem) => {
                tracing::debug!(
                    status = status.as_u16(),
                    request_id = problem.request_id.as_deref().unwrap_or(""),
                    "server rejected request"
                );
                Ok(ApiResponse {
                    request_id: problem.request_id.unwrap_or_default(),
                    success: false,
                    error_message: Some(problem.detail),
                    data: None,
                })
            }
            Err(_) => Err(AgentBayError::UnexpectedResponse(text)),
        }
    }

    /// Flatten serializable params into a query string, skipping nulls.
    /// Map-valued fields (label filters) are carried as compact JSON.
    pub(crate) fn build_query_params<T: serde::Serialize>(
        params: &T,
    ) -> AgentBayResult<String> {
        let mut pairs = Vec::new();
        let value = serde_json::to_value(params)?;

        if let serde_json::Value::Object(map) = value {
            for (key, val) in map {
                if val.is_null() {
                    continue;
                }
                let val_str = match val {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    other => other.to_string(),
                };
                pairs.push(format!("{}={}", key, val_str));
            }
        }

        Ok(pairs.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentbay_api_contract::ListSessionsParams;
    use std::collections::HashMap;

    fn test_client() -> AgentBayClient {
        let config = Config {
            api_key: "test-key".to_string(),
            endpoint: "http://localhost:3001".to_string(),
            timeout_ms: 5000,
        };
        AgentBayClient::new(&config).unwrap()
    }

    #[test]
    fn client_creation_normalizes_base_url() {
        let client = test_client();
        assert_eq!(client.base_url().to_string(), "http://localhost:3001/");
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let config = Config {
            api_key: String::new(),
            endpoint: "not a url".to_string(),
            timeout_ms: 1000,
        };
        assert!(matches!(
            AgentBayClient::new(&config),
            Err(AgentBayError::Url(_))
        ));
    }

    #[test]
    fn query_params_skip_unset_fields() {
        let params = ListSessionsParams {
            status: Some("RUNNING".to_string()),
            max_results: Some(25),
            ..Default::default()
        };
        let query = AgentBayClient::build_query_params(&params).unwrap();
        assert!(query.contains("status=RUNNING"));
        assert!(query.contains("maxResults=25"));
        assert!(!query.contains("nextToken"));
        assert!(!query.contains("page"));
    }

    /// Serve exactly one canned HTTP response on an ephemeral port and
    /// return the endpoint to point a client at.
    async fn serve_once(status_line: &str, body: &str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = stream.read(&mut buf).await;
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        });
        endpoint
    }

    async fn client_for(endpoint: String) -> AgentBayClient {
        AgentBayClient::new(&Config {
            api_key: "test-key".to_string(),
            endpoint,
            timeout_ms: 5000,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn successful_envelopes_pass_through() {
        let body = r#"{"requestId":"req-1","success":true,"data":{"status":"RUNNING"}}"#;
        let endpoint = serve_once("200 OK", body).await;
        let client = client_for(endpoint).await;

        let envelope: ApiResponse<agentbay_api_contract::StatusData> =
            client.get("/api/v1/sessions/sess-1/status").await.unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.request_id, "req-1");
        assert_eq!(
            envelope.data.unwrap().status,
            agentbay_api_contract::SessionStatus::Running
        );
    }

    #[tokio::test]
    async fn problem_details_become_structured_failures() {
        let body = r#"{"type":"about:blank","title":"Not Found","status":404,"detail":"session sess-404 not found","requestId":"req-9"}"#;
        let endpoint = serve_once("404 Not Found", body).await;
        let client = client_for(endpoint).await;

        let envelope: ApiResponse<serde_json::Value> =
            client.get("/api/v1/sessions/sess-404").await.unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.request_id, "req-9");
        assert_eq!(
            envelope.error_message.as_deref(),
            Some("session sess-404 not found")
        );
        assert!(envelope.data.is_none());
    }

    #[tokio::test]
    async fn undecodable_error_bodies_are_unexpected_responses() {
        let endpoint = serve_once("502 Bad Gateway", "<html>upstream unavailable</html>").await;
        let client = client_for(endpoint).await;

        let err = client
            .get::<serde_json::Value>("/api/v1/sessions/sess-1")
            .await
            .unwrap_err();
        match err {
            AgentBayError::UnexpectedResponse(text) => {
                assert!(text.contains("upstream unavailable"));
            }
            other => panic!("expected UnexpectedResponse, got {other:?}"),
        }
    }

    #[test]
    fn label_filters_are_carried_as_json() {
        let params = ListSessionsParams {
            labels: Some(HashMap::from([(
                "team".to_string(),
                "qa".to_string(),
            )])),
            ..Default::default()
        };
        let query = AgentBayClient::build_query_params(&params).unwrap();
        assert!(query.contains(r#"labels={"team":"qa"}"#));
    }
}
