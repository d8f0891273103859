//! Shared HTTP client with retry on transient failures

use std::time::Duration;

use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::RetryTransientMiddleware;
use reqwest_retry::policies::ExponentialBackoff;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::ToolKind;
use crate::{Result, TravelAiError};

pub type HttpClient = ClientWithMiddleware;

/// Why a single upstream call failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(StatusCode),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("response was not valid JSON: {0}")]
    Decode(String),
}

impl FetchError {
    /// The provider refused to serve us (usage policy or rate limit)
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        matches!(
            self,
            FetchError::Status(StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS)
        )
    }

    #[must_use]
    pub fn into_tool(self, tool: ToolKind) -> TravelAiError {
        TravelAiError::tool(tool, self.to_string())
    }
}

/// Build a client; 5xx, 429 and connection errors are retried with
/// exponential backoff up to `max_retries` times.
pub fn build_client(user_agent: &str, timeout: Duration, max_retries: u32) -> Result<HttpClient> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| TravelAiError::config(format!("Failed to create HTTP client: {e}")))?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);
    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Send `request` and decode a successful JSON body.
pub async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> std::result::Result<T, FetchError> {
    let response = request
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let body = response
        .text()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_statuses() {
        assert!(FetchError::Status(StatusCode::FORBIDDEN).is_blocked());
        assert!(FetchError::Status(StatusCode::TOO_MANY_REQUESTS).is_blocked());
        assert!(!FetchError::Status(StatusCode::BAD_GATEWAY).is_blocked());
        assert!(!FetchError::Transport("reset".to_string()).is_blocked());
    }

    #[test]
    fn test_into_tool_keeps_reason() {
        let err = FetchError::Status(StatusCode::SERVICE_UNAVAILABLE).into_tool(ToolKind::Places);
        assert_eq!(err.tool_kind(), Some(ToolKind::Places));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_build_client() {
        assert!(build_client("tripsense-test", Duration::from_secs(5), 2).is_ok());
    }
}
