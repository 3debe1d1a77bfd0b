//! Ladder API Module
//!
//! Read-only lookups against the external ladder ranking service.
//! One GET per call, over a shared HTTP client with connection pooling.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Ladder client errors
#[derive(Error, Debug)]
pub enum LadderError {
    /// The request produced no usable response.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Settings for [`LadderClient`].
#[derive(Debug, Clone)]
pub struct LadderConfig {
    pub base_url: String,
    /// Unset means requests may wait indefinitely.
    pub timeout: Option<Duration>,
}

impl LadderConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }
}

/// Answer from the ladder service.
#[derive(Debug, Clone, PartialEq)]
pub enum LadderResponse {
    /// HTTP 200 with the parsed body.
    Success { body: Value },
    /// Any other status. The message is meant for end users.
    RemoteError { status: u16, message: String },
}

impl LadderResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, LadderResponse::Success { .. })
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            LadderResponse::Success { body } => Some(body),
            LadderResponse::RemoteError { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            LadderResponse::Success { .. } => None,
            LadderResponse::RemoteError { message, .. } => Some(message),
        }
    }

    /// Flat `{success, body, errorMessage}` form for callers that relay it.
    pub fn to_reply(&self) -> LadderReply {
        LadderReply {
            success: self.is_success(),
            body: self.body().cloned(),
            error_message: self.error_message().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LadderReply {
    pub success: bool,
    pub body: Option<Value>,
    pub error_message: Option<String>,
}

pub fn remote_error_message(status: u16, path: &str) -> String {
    format!(
        "Something went wrong. Status code: {} . Path: {}",
        status, path
    )
}

/// Client for the ladder API
#[derive(Debug, Clone)]
pub struct LadderClient {
    base_url: String,
    client: Client,
}

impl LadderClient {
    pub fn new(config: &LadderConfig) -> Result<Self, LadderError> {
        let mut builder = Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(LadderError::Client)?;

        Ok(LadderClient {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `<base_url>/<path>`.
    ///
    /// `path` is appended as given, without escaping. Non-200 statuses are
    /// returned as [`LadderResponse::RemoteError`]; only a missing response
    /// is an `Err`.
    pub async fn make_ladder_request(&self, path: &str) -> Result<LadderResponse, LadderError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(path, "Ladder request");

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!(path, error = %e, "Ladder request failed");
            LadderError::Transport(e)
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(path, status = status.as_u16(), "Ladder returned an error status");
            return Ok(LadderResponse::RemoteError {
                status: status.as_u16(),
                message: remote_error_message(status.as_u16(), path),
            });
        }

        let text = response.text().await?;
        let body = serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text));
        Ok(LadderResponse::Success { body })
    }
}
