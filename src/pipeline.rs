//! Orchestrator - composes the stages into one request/response cycle.

use crate::agent::{GroqSummarizer, SummarizerClient};
use crate::config::{Config, ConfigError, ScraperBackend};
use crate::flight::{RequestError, SearchRequest};
use crate::provider::ProviderError;
use crate::report::DealReport;
use crate::scraper::{DirectScraper, FirecrawlScraper, ScraperClient};
use crate::search::{FirecrawlSearch, SearchClient};
use crate::stages::{
    DeepScrapeStage, FlightSearchStage, PromptSettings, SummaryStage, SCRAPE_MAX_AGE_MS,
    SEARCH_TIMEOUT_MS,
};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Shown in place of page details when deep search is off
pub const DEEP_SEARCH_DISABLED: &str =
    "Deep Search is disabled. Only summarized search results are shown above.";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid search request")]
    InvalidRequest(#[from] RequestError),
    #[error("flight search failed")]
    Search(#[source] ProviderError),
    #[error("summarizing flights failed")]
    Summary(#[source] ProviderError),
}

#[derive(Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to initialise provider client: {0}")]
    Provider(#[from] ProviderError),
}

/// Tunables that are fixed for the lifetime of an orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub result_limit: usize,
    pub search_timeout_ms: u64,
    pub scrape_max_age_ms: u64,
    pub prompt: PromptSettings,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            result_limit: crate::flight::DEFAULT_RESULT_LIMIT,
            search_timeout_ms: SEARCH_TIMEOUT_MS,
            scrape_max_age_ms: SCRAPE_MAX_AGE_MS,
            prompt: PromptSettings::default(),
        }
    }
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            result_limit: config.search.limit,
            search_timeout_ms: config.search.timeout_ms,
            scrape_max_age_ms: config.scraper.max_age_ms,
            prompt: PromptSettings::from(&config.summarizer),
        }
    }
}

/// Runs search cycles. Holds no per-cycle state, so one instance can serve
/// any number of sequential or concurrent cycles.
pub struct Orchestrator {
    search: FlightSearchStage,
    summary: SummaryStage,
    deep: DeepScrapeStage,
    result_limit: usize,
}

impl Orchestrator {
    pub fn new(
        search: Arc<dyn SearchClient>,
        summarizer: Arc<dyn SummarizerClient>,
        scraper: Arc<dyn ScraperClient>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            search: FlightSearchStage::with_timeout(search, settings.search_timeout_ms),
            summary: SummaryStage::new(Arc::clone(&summarizer), settings.prompt.clone()),
            deep: DeepScrapeStage::new(scraper, summarizer, settings.prompt)
                .with_max_cache_age(settings.scrape_max_age_ms),
            result_limit: settings.result_limit,
        }
    }

    /// Build the production provider clients from configuration
    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let firecrawl_key = config.firecrawl_key()?;
        let groq_key = config.groq_key()?;

        let search: Arc<dyn SearchClient> =
            Arc::new(FirecrawlSearch::new(&config.search.base_url, firecrawl_key)?);
        let summarizer: Arc<dyn SummarizerClient> =
            Arc::new(GroqSummarizer::from_config(&config.summarizer, groq_key)?);
        let scraper: Arc<dyn ScraperClient> = match config.scraper.backend {
            ScraperBackend::Firecrawl => {
                Arc::new(FirecrawlScraper::new(&config.scraper.base_url, firecrawl_key)?)
            }
            ScraperBackend::Direct => Arc::new(DirectScraper::new()?),
        };
        tracing::debug!(
            backend = ?config.scraper.backend,
            model = %config.summarizer.model,
            "providers ready"
        );

        Ok(Self::new(
            search,
            summarizer,
            scraper,
            PipelineSettings::from(config),
        ))
    }

    /// Run one cycle with the configured result limit
    pub async fn run(
        &self,
        origin: &str,
        destination: &str,
        deep_search: bool,
    ) -> Result<DealReport, PipelineError> {
        let request = SearchRequest::with_limit(origin, destination, self.result_limit)?;
        self.run_request(&request, deep_search).await
    }

    /// Search, summarize, and optionally deep scrape. A failure in search or
    /// summary ends the cycle; deep scrape never fails.
    pub async fn run_request(
        &self,
        request: &SearchRequest,
        deep_search: bool,
    ) -> Result<DealReport, PipelineError> {
        let started = Instant::now();
        tracing::info!(
            origin = request.origin(),
            destination = request.destination(),
            deep_search,
            "cycle started"
        );

        let flights = self
            .search
            .run(request)
            .await
            .map_err(PipelineError::Search)?;
        let summary = self
            .summary
            .run(&flights)
            .await
            .map_err(PipelineError::Summary)?;

        let deep_details = if deep_search {
            self.deep.run(&flights).await
        } else {
            DEEP_SEARCH_DISABLED.to_string()
        };

        let elapsed_seconds = started.elapsed().as_secs_f64();
        tracing::info!(elapsed_seconds, flights = flights.len(), "cycle finished");
        Ok(DealReport::new(summary, deep_details, elapsed_seconds))
    }
}
