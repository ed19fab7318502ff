use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::service_error::ExternalServiceError;
use crate::service_response::ServiceResponse;

#[async_trait]
/// HTTP transport used by the invoker. Timeouts and retries belong here.
pub trait HttpTransport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        params: &[(String, String)],
        headers: &BTreeMap<String, String>,
    ) -> Result<ServiceResponse, ExternalServiceError>;

    async fn post(
        &self,
        url: &str,
        json_body: String,
        headers: &BTreeMap<String, String>,
    ) -> Result<ServiceResponse, ExternalServiceError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransportConfig {
    pub request_timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ReqwestTransportConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 10_000,
            user_agent: "herald-external-service".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: ReqwestTransportConfig) -> Result<Self, ExternalServiceError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .map_err(|error| ExternalServiceError::Client(error.to_string()))?;
        Ok(Self { http })
    }

    async fn send(
        &self,
        operation: &str,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<ServiceResponse, ExternalServiceError> {
        let transport_error = |detail: String| ExternalServiceError::Transport {
            operation: operation.to_string(),
            url: url.to_string(),
            detail,
        };
        let response = request
            .send()
            .await
            .map_err(|error| transport_error(error.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|error| transport_error(format!("failed to read body: {error}")))?;
        Ok(ServiceResponse { status, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        params: &[(String, String)],
        headers: &BTreeMap<String, String>,
    ) -> Result<ServiceResponse, ExternalServiceError> {
        let request = self
            .http
            .get(url)
            .query(params)
            .headers(build_header_map(headers)?);
        self.send("GET", url, request).await
    }

    async fn post(
        &self,
        url: &str,
        json_body: String,
        headers: &BTreeMap<String, String>,
    ) -> Result<ServiceResponse, ExternalServiceError> {
        let request = self
            .http
            .post(url)
            .headers(build_header_map(headers)?)
            .body(json_body);
        self.send("POST", url, request).await
    }
}

fn build_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ExternalServiceError> {
    let mut header_map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let invalid = |detail: String| ExternalServiceError::InvalidHeader {
            name: name.clone(),
            detail,
        };
        let header_name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|error| invalid(error.to_string()))?;
        let header_value =
            HeaderValue::from_str(value.trim()).map_err(|error| invalid(error.to_string()))?;
        header_map.insert(header_name, header_value);
    }
    Ok(header_map)
}
