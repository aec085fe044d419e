use std::time::Duration;

use exn::ResultExt;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use tracing::instrument;

use crate::error::{ErrorKind, Result};

/// The raw, unmodified JSON document returned by the API.
pub type Payload = serde_json::Value;

pub const DEFAULT_ENDPOINT: &str = "https://api.opensea.io/api/v2/collections";
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");
/// reqwest never times out on its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Marketplace API client.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    endpoint: String,
}

impl Client {
    /// Create a client for the given collections endpoint.
    ///
    /// A missing API key is not rejected here: the header is sent empty and
    /// the server's refusal is handled like any other non-200 response.
    pub fn new(api_key: Option<String>, endpoint: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(api_key: Option<String>, endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(api_key.as_deref().unwrap_or_default()).or_raise(|| ErrorKind::Client)?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .or_raise(|| ErrorKind::Client)?;
        Ok(Self { http, endpoint: endpoint.into() })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch every collection on `chain`.
    ///
    /// Returns `Ok(None)` when the API answers with anything other than
    /// `200 OK`; the status and body are logged. There is no retry.
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn fetch_collections(&self, chain: &str) -> Result<Option<Payload>> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("chain", chain)])
            .send()
            .await
            .or_raise(|| ErrorKind::Network)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %body, "Collections request failed");
            return Ok(None);
        }

        let payload = response.json::<Payload>().await.or_raise(|| ErrorKind::InvalidResponse)?;
        tracing::info!("Fetched collections payload");
        Ok(Some(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> Client {
        Client::new(Some("test-key".to_string()), format!("{}/api/v2/collections", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_success_returns_body_unchanged() {
        let server = MockServer::start().await;
        let body = json!({ "collections": [{ "slug": "cool-cats" }], "next": "abc" });
        Mock::given(method("GET"))
            .and(path("/api/v2/collections"))
            .and(query_param("chain", "ethereum"))
            .and(header("X-API-KEY", "test-key"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let payload = client(&server).fetch_collections("ethereum").await.unwrap();
        assert_eq!(payload, Some(body));
    }

    #[tokio::test]
    async fn test_non_200_returns_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(client(&server).fetch_collections("ethereum").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_other_success_codes_are_not_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(204)).mount(&server).await;

        assert_eq!(client(&server).fetch_collections("ethereum").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_json_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let err = client(&server).fetch_collections("ethereum").await.unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = Client::new(None, "http://127.0.0.1:1/api/v2/collections").unwrap();
        let err = client.fetch_collections("ethereum").await.unwrap_err();
        assert_eq!(*err, ErrorKind::Network);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_invalid_api_key_header() {
        let err = Client::new(Some("bad\nkey".to_string()), DEFAULT_ENDPOINT).unwrap_err();
        assert_eq!(*err, ErrorKind::Client);
    }
}
