// Shared HTTP client for the download backend

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, RETRY_AFTER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::ApiConfig;
use super::errors::{DownloadError, RATE_LIMITED_FALLBACK};

/// Thin wrapper over `reqwest::Client` bound to one backend configuration.
///
/// Cloning is cheap; every backend holds its own copy.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    config: Arc<ApiConfig>,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, DownloadError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);

        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        if let Some(proxy_url) = config.proxy.as_deref() {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
                DownloadError::Config(format!("Invalid proxy URL {}: {}", proxy_url, e))
            })?;
            log::debug!("[Http] Using proxy {}", proxy_url);
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| DownloadError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// POST a JSON payload to a backend route
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        route: &str,
        payload: &T,
    ) -> Result<ApiResponse, DownloadError> {
        let endpoint = self.config.endpoint(route);
        log::debug!("[Http] POST {}", endpoint);

        let response = self.client.post(&endpoint).json(payload).send().await?;
        ApiResponse::read(response).await
    }

    /// GET a backend route with query parameters
    pub async fn get(
        &self,
        route: &str,
        query: &[(&str, &str)],
    ) -> Result<ApiResponse, DownloadError> {
        let endpoint = self.config.endpoint(route);
        log::debug!("[Http] GET {}", endpoint);

        let response = self.client.get(&endpoint).query(query).send().await?;
        ApiResponse::read(response).await
    }

    /// Status-only GET bounded by `timeout`; the body is never read.
    pub async fn probe(&self, route: &str, timeout: Duration) -> Result<StatusCode, DownloadError> {
        let endpoint = self.config.endpoint(route);
        let response = self
            .client
            .get(&endpoint)
            .timeout(timeout)
            .send()
            .await?;
        Ok(response.status())
    }
}

/// Status plus best-effort JSON body
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    /// `None` when the body is empty or not JSON
    pub body: Option<Value>,
    retry_after_header: Option<String>,
}

impl ApiResponse {
    async fn read(response: reqwest::Response) -> Result<Self, DownloadError> {
        let status = response.status();
        let retry_after_header = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes).ok();

        log::debug!("[Http] Response status: {}", status);

        Ok(Self {
            status,
            body,
            retry_after_header,
        })
    }

    #[cfg(test)]
    pub(crate) fn new(status: u16, body: Option<Value>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body,
            retry_after_header: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    fn text_field(&self, key: &str) -> Option<String> {
        self.body
            .as_ref()
            .and_then(|b| b.get(key))
            .and_then(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }

    /// Human text the backend attached to an error, if any
    pub fn backend_message(&self) -> Option<String> {
        self.text_field("message").or_else(|| self.text_field("error"))
    }

    /// Cool-down hint from the body, falling back to the `Retry-After` header
    pub fn retry_after(&self) -> Option<String> {
        self.text_field("retryAfter")
            .or_else(|| self.retry_after_header.clone())
    }

    /// Shared error mapping for non-2xx statuses; `None` for 2xx.
    pub fn status_error(&self) -> Option<DownloadError> {
        if self.is_success() {
            return None;
        }

        let status = self.status.as_u16();
        if self.status == StatusCode::TOO_MANY_REQUESTS {
            return Some(DownloadError::RateLimited {
                message: self
                    .backend_message()
                    .unwrap_or_else(|| RATE_LIMITED_FALLBACK.to_string()),
                retry_after: self.retry_after(),
            });
        }

        Some(DownloadError::Http {
            status,
            message: self
                .backend_message()
                .unwrap_or_else(|| format!("HTTP error! status: {}", status)),
        })
    }

    /// Decode the body into `T`; a missing or non-JSON body is a parse error.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, DownloadError> {
        let body = self
            .body
            .ok_or_else(|| DownloadError::parse("Invalid JSON in backend response"))?;
        Ok(serde_json::from_value(body)?)
    }
}

/// `{success, message, method, error, data}` wrapper shared by the backends
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub method: Option<String>,
    pub error: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Backend-declared error text, for envelopes that report failure
    pub fn error_text(&self) -> Option<String> {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .filter(|s| !s.is_empty())
    }
}
