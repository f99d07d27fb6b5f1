//! # Farefinder
//!
//! A terminal tool that finds flight listings with a web-search API, summarises
//! them with an LLM, and optionally scrapes the top booking page for details.
//!
//! ## Pipeline
//!
//! - **Search**: `Find flights from {origin} to {destination}`, past week only
//! - **Summary**: one markdown block per flight (route, price, key points, link)
//! - **Deep search** (opt-in): first booking page that scrapes cleanly, condensed for a traveler
//!
//! Provider clients sit behind the [`SearchClient`], [`SummarizerClient`] and
//! [`ScraperClient`] traits and are handed to the [`Orchestrator`] at startup.

pub mod agent;
pub mod config;
pub mod flight;
pub mod pipeline;
pub mod provider;
pub mod report;
pub mod scraper;
pub mod search;
pub mod stages;
pub mod ui;

pub use agent::SummarizerClient;
pub use config::Config;
pub use flight::{FlightResult, SearchRequest};
pub use pipeline::{Orchestrator, PipelineError, PipelineSettings};
pub use provider::ProviderError;
pub use report::DealReport;
pub use scraper::{ScrapeOutcome, ScraperClient};
pub use search::SearchClient;
