//! DealReport - the terminal artifact of one search cycle.

/// Markdown produced by the summarizer. No structure is enforced.
pub type SummaryText = String;

/// Everything the presentation layer shows after a cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct DealReport {
    /// Markdown digest of the search results
    pub summary: SummaryText,
    /// Summary of the scraped booking page, or a status line
    pub deep_details: String,
    /// Wall-clock duration of the whole cycle
    pub elapsed_seconds: f64,
}

impl DealReport {
    pub fn new(summary: SummaryText, deep_details: String, elapsed_seconds: f64) -> Self {
        Self {
            summary,
            deep_details,
            elapsed_seconds,
        }
    }

    /// Human-readable timing line
    pub fn elapsed_text(&self) -> String {
        format!("Processing time: {:.2} seconds", self.elapsed_seconds)
    }
}
