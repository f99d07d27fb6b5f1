//! Web scraping module for booking-page extraction.
//!
//! Two backends implement [`ScraperClient`]: the Firecrawl scrape API, and a
//! direct fetch that parses the HTML with `scraper`. Neither ever returns an
//! error; failures come back as [`ScrapeOutcome::Failure`] so deep search can
//! move on to the next candidate.

use crate::provider::{self, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const FIRECRAWL: &str = "scraper";
const DIRECT: &str = "direct fetch";

/// Paragraphs shorter than this are usually navigation or cookie chrome
const MIN_PARAGRAPH_CHARS: usize = 20;

/// Result of one scrape attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Success { content: String },
    Failure { reason: String, trace: String },
}

impl ScrapeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ScrapeOutcome::Success { .. })
    }

    fn from_result(result: Result<String, ScrapeError>) -> Self {
        match result {
            Ok(content) => ScrapeOutcome::Success { content },
            Err(err) => ScrapeOutcome::Failure {
                reason: err.to_string(),
                trace: provider::error_trace(&err),
            },
        }
    }
}

#[derive(Error, Debug)]
enum ScrapeError {
    #[error("invalid URL")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[async_trait]
pub trait ScraperClient: Send + Sync {
    /// Fetch a page as markdown. `max_cache_age_ms` is a hint that a recent
    /// cached copy is acceptable.
    async fn fetch_markdown(&self, url: &str, max_cache_age_ms: u64) -> ScrapeOutcome;
}

/// Only absolute http(s) URLs are worth sending anywhere
fn parse_target(url: &str) -> Result<Url, ScrapeError> {
    let parsed = Url::parse(url)?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ScrapeError::UnsupportedScheme(other.to_string())),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequestBody<'a> {
    url: &'a str,
    formats: [&'static str; 1],
    max_age: u64,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    data: Option<ScrapeData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    #[serde(default)]
    markdown: Option<String>,
}

/// Firecrawl `/v1/scrape` wrapper.
pub struct FirecrawlScraper {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FirecrawlScraper {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = provider::create_client().map_err(ProviderError::request(FIRECRAWL))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    async fn try_fetch(&self, url: &str, max_cache_age_ms: u64) -> Result<String, ScrapeError> {
        let target = parse_target(url)?;
        let body = ScrapeRequestBody {
            url: target.as_str(),
            formats: ["markdown"],
            max_age: max_cache_age_ms,
        };

        let response = self
            .client
            .post(provider::endpoint(&self.base_url, "v1/scrape"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::request(FIRECRAWL))?;

        let parsed: ScrapeResponse = provider::read_json(FIRECRAWL, response).await?;
        if parsed.success == Some(false) {
            let message = parsed
                .error
                .unwrap_or_else(|| "provider reported failure".to_string());
            return Err(ProviderError::content_missing(FIRECRAWL, message).into());
        }

        parsed
            .data
            .and_then(|data| data.markdown)
            .filter(|markdown| !markdown.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::content_missing(FIRECRAWL, "no markdown content returned").into()
            })
    }
}

#[async_trait]
impl ScraperClient for FirecrawlScraper {
    async fn fetch_markdown(&self, url: &str, max_cache_age_ms: u64) -> ScrapeOutcome {
        ScrapeOutcome::from_result(self.try_fetch(url, max_cache_age_ms).await)
    }
}

/// Fetches pages itself and extracts readable text as light markdown.
/// There is no cache, so `max_cache_age_ms` is ignored.
pub struct DirectScraper {
    client: Client,
}

impl DirectScraper {
    pub fn new() -> Result<Self, ProviderError> {
        let client = provider::create_client().map_err(ProviderError::request(DIRECT))?;
        Ok(Self { client })
    }

    async fn try_fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let target = parse_target(url)?;
        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(ProviderError::request(DIRECT))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: DIRECT,
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("").to_string(),
            }
            .into());
        }

        let html = response
            .text()
            .await
            .map_err(ProviderError::request(DIRECT))?;
        let markdown = html_to_markdown(&html);
        if markdown.trim().is_empty() {
            return Err(ProviderError::content_missing(DIRECT, "no readable text on page").into());
        }
        Ok(markdown)
    }
}

#[async_trait]
impl ScraperClient for DirectScraper {
    async fn fetch_markdown(&self, url: &str, _max_cache_age_ms: u64) -> ScrapeOutcome {
        ScrapeOutcome::from_result(self.try_fetch(url).await)
    }
}

/// Extract readable content, preferring the main content area of the page
pub fn html_to_markdown(html: &str) -> String {
    let document = Html::parse_document(html);

    let main_selectors = ["article", "main", "[role='main']", ".content", "#content"];
    for selector_str in main_selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                let text = extract_blocks(element);
                if !text.trim().is_empty() {
                    return text;
                }
            }
        }
    }

    extract_blocks(document.root_element())
}

/// Headings become `#` lines, list items `-` lines, paragraphs plain text
fn extract_blocks(root: ElementRef<'_>) -> String {
    let Ok(block_selector) = Selector::parse("p, h1, h2, h3, h4, h5, h6, li") else {
        return String::new();
    };

    let mut blocks: Vec<String> = Vec::new();
    for element in root.select(&block_selector) {
        let text = element.text().collect::<Vec<_>>().join(" ");
        let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if cleaned.is_empty() {
            continue;
        }

        let name = element.value().name();
        if name == "p" && inside_list_item(element) {
            continue;
        }
        let block = match name {
            "li" => format!("- {cleaned}"),
            "p" if cleaned.chars().count() <= MIN_PARAGRAPH_CHARS => continue,
            "p" => cleaned,
            heading => {
                let level = heading[1..].parse::<usize>().unwrap_or(1);
                format!("{} {}", "#".repeat(level), cleaned)
            }
        };
        blocks.push(block);
    }

    blocks.join("\n\n")
}

/// The enclosing `li` already carries this text
fn inside_list_item(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "li")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_main_content_as_markdown() {
        let html = r#"
            <html><body>
              <nav><p>Home | Flights | Hotels | Deals | Contact us</p></nav>
              <main>
                <h1>Oslo to Rome</h1>
                <p>Direct flights every Tuesday and Friday from Gardermoen.</p>
                <p>Short</p>
                <ul><li>Cabin bag included</li><li>Free seat selection</li></ul>
              </main>
            </body></html>
        "#;
        let markdown = html_to_markdown(html);
        assert_eq!(
            markdown,
            "# Oslo to Rome\n\n\
             Direct flights every Tuesday and Friday from Gardermoen.\n\n\
             - Cabin bag included\n\n\
             - Free seat selection"
        );
    }

    #[test]
    fn paragraphs_inside_list_items_are_not_repeated() {
        let html = "<html><body><main><ul>\
                    <li><p>Free cancellation within 24 hours of booking.</p></li>\
                    </ul></main></body></html>";
        assert_eq!(
            html_to_markdown(html),
            "- Free cancellation within 24 hours of booking."
        );
    }

    #[test]
    fn falls_back_to_whole_document() {
        let html = "<html><body><h2>Fare rules</h2>\
                    <p>Changes allowed for a fee of 50 EUR per passenger.</p></body></html>";
        let markdown = html_to_markdown(html);
        assert!(markdown.starts_with("## Fare rules"));
        assert!(markdown.contains("50 EUR"));
    }

    #[test]
    fn relative_and_non_http_urls_are_rejected() {
        assert!(matches!(
            parse_target("/flights/123"),
            Err(ScrapeError::InvalidUrl(_))
        ));
        assert!(matches!(
            parse_target("ftp://example.com/file"),
            Err(ScrapeError::UnsupportedScheme(_))
        ));
        assert!(parse_target("https://example.com/deal").is_ok());
    }

    #[test]
    fn failure_carries_cause_and_trace() {
        let outcome = ScrapeOutcome::from_result(Err(ProviderError::content_missing(
            FIRECRAWL,
            "no markdown content returned",
        )
        .into()));
        match outcome {
            ScrapeOutcome::Failure { reason, trace } => {
                assert!(reason.contains("no markdown content returned"));
                assert!(trace.starts_with(&reason));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
