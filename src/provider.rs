//! Shared plumbing for the three upstream providers.
//!
//! Every provider call is a single attempt; failures are reported as a
//! [`ProviderError`] and the caller decides whether to propagate or degrade.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// User-Agent string identifying this client
const USER_AGENT: &str = concat!("farefinder/", env!("CARGO_PKG_VERSION"));

/// Default timeout for HTTP requests
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest upstream body echoed back in an error message
const MAX_ERROR_BODY: usize = 300;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} request failed")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} returned HTTP {status}: {message}")]
    Status {
        provider: &'static str,
        status: u16,
        message: String,
    },
    #[error("{provider} returned a malformed response: {message}")]
    Malformed {
        provider: &'static str,
        message: String,
    },
    #[error("{provider} returned no usable content: {message}")]
    ContentMissing {
        provider: &'static str,
        message: String,
    },
    #[error("invalid {provider} request: {message}")]
    InvalidRequest {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    pub fn request(provider: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| ProviderError::Request { provider, source }
    }

    pub fn content_missing(provider: &'static str, message: impl Into<String>) -> Self {
        ProviderError::ContentMissing {
            provider,
            message: message.into(),
        }
    }

    pub fn invalid_request(provider: &'static str, message: impl Into<String>) -> Self {
        ProviderError::InvalidRequest {
            provider,
            message: message.into(),
        }
    }
}

/// Create a configured HTTP client shared by a provider wrapper
pub fn create_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
}

/// Join a configured base URL and an endpoint path without doubling slashes
pub fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Turn a non-success status into [`ProviderError::Status`], then decode the
/// JSON body.
pub async fn read_json<T: DeserializeOwned>(
    provider: &'static str,
    response: Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(ProviderError::request(provider))?;

    if !status.is_success() {
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
            message: snippet(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| ProviderError::Malformed {
        provider,
        message: format!("{}: {}", e, snippet(&body)),
    })
}

/// Render an error and its source chain, one cause per line
pub fn error_trace(err: &dyn std::error::Error) -> String {
    let mut lines = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {cause}"));
        source = cause.source();
    }
    lines.join("\n")
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > MAX_ERROR_BODY {
        let cut: String = trimmed.chars().take(MAX_ERROR_BODY).collect();
        format!("{cut}…")
    } else {
        trimmed.to_string()
    }
}
