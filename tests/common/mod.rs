#![allow(dead_code)]

use async_trait::async_trait;
use farefinder::flight::RecencyWindow;
use farefinder::search::RawRecord;
use farefinder::{ProviderError, ScrapeOutcome, ScraperClient, SearchClient, SummarizerClient};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;

pub fn record(title: &str, url: &str, description: &str) -> RawRecord {
    json!({ "title": title, "url": url, "description": description })
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchCall {
    pub query: String,
    pub limit: usize,
    pub recency: RecencyWindow,
    pub timeout_ms: u64,
}

/// Returns canned records, or a 503 when `failing` is set.
#[derive(Default)]
pub struct MockSearch {
    records: Vec<RawRecord>,
    failing: bool,
    pub calls: Mutex<Vec<SearchCall>>,
}

impl MockSearch {
    pub fn returning(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchClient for MockSearch {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        recency: RecencyWindow,
        timeout_ms: u64,
    ) -> Result<Vec<RawRecord>, ProviderError> {
        self.calls.lock().unwrap().push(SearchCall {
            query: query.to_string(),
            limit,
            recency,
            timeout_ms,
        });
        if self.failing {
            return Err(ProviderError::Status {
                provider: "search",
                status: 503,
                message: "simulated outage".to_string(),
            });
        }
        Ok(self.records.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummarizeCall {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Answers `summary #n`, failing any prompt that contains `fail_when`.
#[derive(Default)]
pub struct MockSummarizer {
    fail_when: Option<String>,
    pub calls: Mutex<Vec<SummarizeCall>>,
}

impl MockSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_when(needle: &str) -> Self {
        Self {
            fail_when: Some(needle.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<SummarizeCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SummarizerClient for MockSummarizer {
    async fn summarize(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(SummarizeCall {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
            max_tokens,
            temperature,
        });
        if let Some(needle) = &self.fail_when {
            if user_prompt.contains(needle.as_str()) {
                return Err(ProviderError::Status {
                    provider: "summarizer",
                    status: 429,
                    message: "quota exceeded".to_string(),
                });
            }
        }
        Ok(format!("  summary #{}  \n", calls.len()))
    }
}

/// Serves pages by URL; anything unknown fails.
#[derive(Default)]
pub struct MockScraper {
    pages: HashMap<String, String>,
    pub calls: Mutex<Vec<(String, u64)>>,
}

impl MockScraper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, content: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), content.into());
        self
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }
}

#[async_trait]
impl ScraperClient for MockScraper {
    async fn fetch_markdown(&self, url: &str, max_cache_age_ms: u64) -> ScrapeOutcome {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), max_cache_age_ms));
        match self.pages.get(url) {
            Some(content) => ScrapeOutcome::Success {
                content: content.clone(),
            },
            None => ScrapeOutcome::Failure {
                reason: format!("no page for {url}"),
                trace: "mock scraper".to_string(),
            },
        }
    }
}
