//! reqwest-backed [`ApiClient`].

use crate::client::{ApiClient, ApiRequest, ApiResponse, HttpMethod};
use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use rootcause::prelude::Report;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_USER_AGENT: &str = "SelfserviceBot/1.0";

/// Settings for [`HttpApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Overall request timeout.
    pub timeout: Duration,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// API client over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
}

impl HttpApiClient {
    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &HttpClientConfig) -> Result<Self, Report<ClientError>> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ClientError::BuildFailed {
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn execute(&self, request: ApiRequest) -> ApiResponse {
        let raw_url = request.url.trim();
        if raw_url.is_empty() {
            return ApiResponse::transport_failure("Endpoint URL is not configured.");
        }
        let url = match reqwest::Url::parse(raw_url) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "invalid API URL configured");
                return ApiResponse::transport_failure("Invalid endpoint URL.");
            }
        };

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), url)
            .header(ACCEPT, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = request.token() {
            builder = builder.bearer_auth(token);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "API call failed");
                return ApiResponse::transport_failure(e.to_string());
            }
        };

        let status = response.status();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_ascii_lowercase(), value.to_string()))
            })
            .collect();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(status = status.as_u16(), error = %e, "failed to read API response body");
                return ApiResponse::transport_failure(format!("failed to read response body: {e}"));
            }
        };
        debug!(status = status.as_u16(), bytes = body.len(), "API call completed");

        ApiResponse {
            success: status.is_success(),
            status_code: status.as_u16(),
            headers,
            body: Some(body),
            error_message: (!status.is_success()).then(|| status.to_string()),
        }
    }
}
