//! Web search client backed by the Firecrawl search API.

use crate::flight::RecencyWindow;
use crate::provider::{self, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER: &str = "search";

/// Extra time granted on top of the provider-side timeout before we give up
const TIMEOUT_SLACK: Duration = Duration::from_secs(5);

/// A search hit exactly as the provider returned it. Field presence is not
/// guaranteed; see `stages::FlightSearchStage` for the normalization.
pub type RawRecord = serde_json::Value;

#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Run one query and return the provider's records in relevance order.
    async fn search(
        &self,
        query: &str,
        limit: usize,
        recency: RecencyWindow,
        timeout_ms: u64,
    ) -> Result<Vec<RawRecord>, ProviderError>;
}

#[derive(Serialize)]
struct SearchRequestBody<'a> {
    query: &'a str,
    limit: usize,
    tbs: &'static str,
    timeout: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    data: Option<Vec<RawRecord>>,
    #[serde(default)]
    error: Option<String>,
}

/// Firecrawl `/v1/search` wrapper.
pub struct FirecrawlSearch {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FirecrawlSearch {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = provider::create_client().map_err(ProviderError::request(PROVIDER))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl SearchClient for FirecrawlSearch {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        recency: RecencyWindow,
        timeout_ms: u64,
    ) -> Result<Vec<RawRecord>, ProviderError> {
        if query.trim().is_empty() {
            return Err(ProviderError::invalid_request(PROVIDER, "query is empty"));
        }
        if limit == 0 {
            return Err(ProviderError::invalid_request(PROVIDER, "limit must be > 0"));
        }

        let body = SearchRequestBody {
            query,
            limit,
            tbs: recency.as_tbs(),
            timeout: timeout_ms,
        };
        tracing::debug!(query, limit, tbs = body.tbs, timeout_ms, "search.request");

        let response = self
            .client
            .post(provider::endpoint(&self.base_url, "v1/search"))
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_millis(timeout_ms) + TIMEOUT_SLACK)
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::request(PROVIDER))?;

        let parsed: SearchResponse = provider::read_json(PROVIDER, response).await?;
        if parsed.success == Some(false) {
            return Err(ProviderError::Malformed {
                provider: PROVIDER,
                message: parsed
                    .error
                    .unwrap_or_else(|| "provider reported failure".to_string()),
            });
        }

        let records = parsed.data.ok_or_else(|| ProviderError::Malformed {
            provider: PROVIDER,
            message: "response has no `data` array".to_string(),
        })?;
        tracing::debug!(count = records.len(), "search.response");
        Ok(records)
    }
}
