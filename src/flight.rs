//! Flight search inputs and normalized results.

use serde::Serialize;
use thiserror::Error;

/// Number of results requested when the caller does not say otherwise
pub const DEFAULT_RESULT_LIMIT: usize = 5;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequestError {
    #[error("origin city must not be empty")]
    EmptyOrigin,
    #[error("destination city must not be empty")]
    EmptyDestination,
    #[error("result limit must be greater than zero")]
    ZeroLimit,
}

/// Trailing window a search result must have been indexed within.
///
/// Only one window is used, but it is kept as a type so the provider mapping
/// lives in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecencyWindow {
    #[default]
    PastWeek,
}

impl RecencyWindow {
    /// Google-style `tbs` filter understood by the search provider
    pub fn as_tbs(&self) -> &'static str {
        match self {
            RecencyWindow::PastWeek => "qdr:w",
        }
    }
}

/// One user submission: where from, where to, and how many results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    origin: String,
    destination: String,
    result_limit: usize,
    recency: RecencyWindow,
}

impl SearchRequest {
    /// Create a request with the default result limit
    pub fn new(origin: &str, destination: &str) -> Result<Self, RequestError> {
        Self::with_limit(origin, destination, DEFAULT_RESULT_LIMIT)
    }

    pub fn with_limit(
        origin: &str,
        destination: &str,
        result_limit: usize,
    ) -> Result<Self, RequestError> {
        let origin = origin.trim();
        let destination = destination.trim();
        if origin.is_empty() {
            return Err(RequestError::EmptyOrigin);
        }
        if destination.is_empty() {
            return Err(RequestError::EmptyDestination);
        }
        if result_limit == 0 {
            return Err(RequestError::ZeroLimit);
        }

        Ok(Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            result_limit,
            recency: RecencyWindow::PastWeek,
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn result_limit(&self) -> usize {
        self.result_limit
    }

    pub fn recency(&self) -> RecencyWindow {
        self.recency
    }

    /// Natural-language query sent to the search provider
    pub fn query(&self) -> String {
        format!("Find flights from {} to {}", self.origin, self.destination)
    }
}

/// A single flight listing, in the order the search provider ranked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlightResult {
    pub title: String,
    /// Absolute URL of the listing
    pub url: String,
    pub description: String,
}

impl FlightResult {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description: description.into(),
        }
    }
}
