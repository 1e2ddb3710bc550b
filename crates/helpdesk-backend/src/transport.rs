use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::BackendConfig;
use crate::error::BackendError;

/// Seam between the typed client and the HTTP layer. Every backend contract
/// is JSON over HTTPS POST, so one method covers all of them.
#[async_trait]
pub trait JsonTransport: Send + Sync {
    async fn post(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, BackendError>;
}

#[derive(Clone)]
pub struct ReqwestJsonTransport {
    base_url: String,
    request_timeout: Duration,
    client: reqwest::Client,
}

impl fmt::Debug for ReqwestJsonTransport {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ReqwestJsonTransport")
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ReqwestJsonTransport {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .user_agent("helpdesk-client")
            .build()
            .map_err(|err| {
                BackendError::Transport(format!("failed to initialize HTTP client: {err}"))
            })?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_owned(),
            request_timeout: config.request_timeout,
            client,
        })
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

#[async_trait]
impl JsonTransport for ReqwestJsonTransport {
    async fn post(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, BackendError> {
        let url = self.endpoint_url(endpoint);
        let request = self.client.post(&url).json(&body).send();

        // The ceiling is enforced by cancellation: a request that outlives it
        // is dropped, not awaited to completion.
        let response = tokio::time::timeout(self.request_timeout, request)
            .await
            .map_err(|_| {
                BackendError::Transport(format!(
                    "request to {endpoint} timed out after {:?}",
                    self.request_timeout
                ))
            })?
            .map_err(|err| BackendError::Transport(format!("failed to call {endpoint}: {err}")))?;

        let status = response.status();
        let text = response.text().await.map_err(|err| {
            BackendError::Transport(format!("failed to read response from {endpoint}: {err}"))
        })?;

        if !status.is_success() {
            return Err(BackendError::Transport(format!(
                "{endpoint} returned HTTP {status}: {}",
                truncate_for_error(&text)
            )));
        }

        serde_json::from_str(&text).map_err(|err| {
            BackendError::Transport(format!("non-JSON response from {endpoint}: {err}"))
        })
    }
}

fn truncate_for_error(body: &str) -> String {
    const MAX_LEN: usize = 200;
    if body.chars().count() <= MAX_LEN {
        body.to_owned()
    } else {
        format!("{}...", body.chars().take(MAX_LEN).collect::<String>())
    }
}
