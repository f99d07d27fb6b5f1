//! The three stages of a search cycle: search, summarize, deep scrape.

use crate::agent::SummarizerClient;
use crate::config::SummarizerConfig;
use crate::flight::{FlightResult, SearchRequest};
use crate::provider::ProviderError;
use crate::report::SummaryText;
use crate::scraper::{ScrapeOutcome, ScraperClient};
use crate::search::{RawRecord, SearchClient};
use std::sync::Arc;

/// Scraped pages are cut to this many characters before summarization
pub const SCRAPE_CHAR_LIMIT: usize = 1500;

/// Returned by deep search when no candidate page could be used
pub const NO_RESULTS_TO_SCRAPE: &str = "No results to scrape.";

/// Default provider-side timeout for a flight search, in milliseconds
pub const SEARCH_TIMEOUT_MS: u64 = 30_000;

/// Default age of a cached page copy the scraper may reuse, in milliseconds
pub const SCRAPE_MAX_AGE_MS: u64 = 3_600_000;

/// How the summarizer is prompted; shared by both summarizing stages
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSettings {
    pub persona: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for PromptSettings {
    fn default() -> Self {
        PromptSettings::from(&SummarizerConfig::default())
    }
}

impl From<&SummarizerConfig> for PromptSettings {
    fn from(config: &SummarizerConfig) -> Self {
        Self {
            persona: config.persona.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Cut `text` to at most `limit` characters without splitting one
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Turns an origin/destination pair into normalized flight results.
pub struct FlightSearchStage {
    client: Arc<dyn SearchClient>,
    timeout_ms: u64,
}

impl FlightSearchStage {
    pub fn new(client: Arc<dyn SearchClient>) -> Self {
        Self::with_timeout(client, SEARCH_TIMEOUT_MS)
    }

    pub fn with_timeout(client: Arc<dyn SearchClient>, timeout_ms: u64) -> Self {
        Self { client, timeout_ms }
    }

    pub async fn run(&self, request: &SearchRequest) -> Result<Vec<FlightResult>, ProviderError> {
        let query = request.query();
        let records = self
            .client
            .search(
                &query,
                request.result_limit(),
                request.recency(),
                self.timeout_ms,
            )
            .await?;

        let received = records.len();
        let flights: Vec<FlightResult> = records
            .iter()
            .filter_map(to_flight_result)
            .take(request.result_limit())
            .collect();
        tracing::info!(%query, received, kept = flights.len(), "flight search finished");
        Ok(flights)
    }
}

/// Map one raw record, treating absent or non-string fields as empty.
/// Records without an absolute URL are useless downstream and are dropped.
fn to_flight_result(record: &RawRecord) -> Option<FlightResult> {
    let field = |name: &str| {
        record
            .get(name)
            .and_then(|value| value.as_str())
            .unwrap_or_default()
            .trim()
            .to_string()
    };

    let url = field("url");
    if url::Url::parse(&url).is_err() {
        tracing::debug!(%url, "dropping search record without an absolute url");
        return None;
    }
    Some(FlightResult::new(field("title"), url, field("description")))
}

/// Condenses the search results into a markdown digest.
pub struct SummaryStage {
    client: Arc<dyn SummarizerClient>,
    settings: PromptSettings,
}

impl SummaryStage {
    pub fn new(client: Arc<dyn SummarizerClient>, settings: PromptSettings) -> Self {
        Self { client, settings }
    }

    /// An empty list is still sent; the model answers with a "no flights" digest.
    pub async fn run(&self, flights: &[FlightResult]) -> Result<SummaryText, ProviderError> {
        let prompt = summary_prompt(flights);
        let text = self
            .client
            .summarize(
                &self.settings.persona,
                &prompt,
                self.settings.max_tokens,
                self.settings.temperature,
            )
            .await?;
        tracing::info!(flights = flights.len(), "flight summary generated");
        Ok(text.trim().to_string())
    }
}

fn summary_prompt(flights: &[FlightResult]) -> String {
    let listing = serde_json::to_string_pretty(flights).unwrap_or_else(|_| format!("{flights:?}"));
    format!(
        r#"Summarize these flight search results in clear, visually appealing markdown. For each flight, use the following format:

---
## [Airline Name]

- **Route:** [Origin] → [Destination]
- **Price:** [Price or 'Not quoted']
- **Key Points:** [Key features or restrictions]
- **Book:** [Link with airline name](URL)

---

{listing}"#
    )
}

/// Scrapes candidate booking pages in order and summarizes the first that works.
pub struct DeepScrapeStage {
    scraper: Arc<dyn ScraperClient>,
    summarizer: Arc<dyn SummarizerClient>,
    settings: PromptSettings,
    max_cache_age_ms: u64,
}

impl DeepScrapeStage {
    pub fn new(
        scraper: Arc<dyn ScraperClient>,
        summarizer: Arc<dyn SummarizerClient>,
        settings: PromptSettings,
    ) -> Self {
        Self {
            scraper,
            summarizer,
            settings,
            max_cache_age_ms: SCRAPE_MAX_AGE_MS,
        }
    }

    pub fn with_max_cache_age(mut self, max_cache_age_ms: u64) -> Self {
        self.max_cache_age_ms = max_cache_age_ms;
        self
    }

    /// Never fails: every per-page problem is logged and skipped.
    pub async fn run(&self, flights: &[FlightResult]) -> String {
        for (position, flight) in flights.iter().enumerate() {
            let content = match self
                .scraper
                .fetch_markdown(&flight.url, self.max_cache_age_ms)
                .await
            {
                ScrapeOutcome::Success { content } => content,
                ScrapeOutcome::Failure { reason, trace } => {
                    tracing::warn!(
                        url = %flight.url,
                        position,
                        %reason,
                        "scrape failed, trying next result"
                    );
                    tracing::debug!(url = %flight.url, %trace, "scrape failure trace");
                    continue;
                }
            };

            let excerpt = truncate_chars(&content, SCRAPE_CHAR_LIMIT);
            let prompt = format!(
                "Summarize the key details from this flight booking page for a traveler.\n{excerpt}"
            );
            match self
                .summarizer
                .summarize(
                    &self.settings.persona,
                    &prompt,
                    self.settings.max_tokens,
                    self.settings.temperature,
                )
                .await
            {
                Ok(details) => {
                    tracing::info!(url = %flight.url, position, "deep search summarized page");
                    return details.trim().to_string();
                }
                Err(err) => {
                    tracing::warn!(
                        url = %flight.url,
                        position,
                        error = %err,
                        "page summary failed, trying next result"
                    );
                }
            }
        }

        NO_RESULTS_TO_SCRAPE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "é".repeat(2_000);
        let cut = truncate_chars(&text, SCRAPE_CHAR_LIMIT);
        assert_eq!(cut.chars().count(), SCRAPE_CHAR_LIMIT);
        assert_eq!(truncate_chars("short", SCRAPE_CHAR_LIMIT), "short");
    }

    #[test]
    fn records_with_missing_fields_map_to_empty_strings() {
        let record = json!({ "url": "https://example.com/deal", "position": 3 });
        let flight = to_flight_result(&record).unwrap();
        assert_eq!(
            flight,
            FlightResult::new("", "https://example.com/deal", "")
        );
    }

    #[test]
    fn records_without_absolute_url_are_dropped() {
        assert!(to_flight_result(&json!({ "title": "No link" })).is_none());
        assert!(to_flight_result(&json!({ "url": "/relative" })).is_none());
        assert!(to_flight_result(&json!({ "url": 42 })).is_none());
    }

    #[test]
    fn summary_prompt_lists_every_flight() {
        let flights = vec![
            FlightResult::new("ANA", "https://ana.example/nyc-tyo", "Daily nonstop"),
            FlightResult::new("JAL", "https://jal.example/nyc-tyo", "From $899"),
        ];
        let prompt = summary_prompt(&flights);
        assert!(prompt.contains("'Not quoted'"));
        assert!(prompt.contains("https://ana.example/nyc-tyo"));
        assert!(prompt.contains("From $899"));
    }
}
