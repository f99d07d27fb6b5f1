//! Terminal presentation layer.
//!
//! Collects origin, destination and the deep-search toggle with `dialoguer`,
//! runs one cycle per submission, and prints the three outputs. A failed
//! cycle is shown as text; the session keeps going.

use crate::pipeline::{Orchestrator, PipelineError};
use crate::provider::error_trace;
use crate::report::DealReport;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};

const DEFAULT_ORIGIN: &str = "New York";
const DEFAULT_DESTINATION: &str = "Tokyo";

/// One submission from the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub origin: String,
    pub destination: String,
    pub deep_search: bool,
}

/// Run the interactive session until the user declines another search
pub async fn run(orchestrator: &Orchestrator) -> anyhow::Result<()> {
    println!("{}", "Travel Deal Finder ✈️".bold().cyan());
    println!("Enter your origin and destination to find and summarise the best flight deals!\n");

    let theme = ColorfulTheme::default();
    let mut last = Submission {
        origin: DEFAULT_ORIGIN.to_string(),
        destination: DEFAULT_DESTINATION.to_string(),
        deep_search: false,
    };

    loop {
        let submission = prompt(&theme, &last)?;
        println!("\n{}", "Processing...".dimmed());

        let outcome = orchestrator
            .run(
                &submission.origin,
                &submission.destination,
                submission.deep_search,
            )
            .await;
        print_outcome(&outcome);
        last = submission;

        let again = Confirm::with_theme(&theme)
            .with_prompt("Search again?")
            .default(true)
            .interact()?;
        if !again {
            return Ok(());
        }
        println!();
    }
}

fn prompt(theme: &ColorfulTheme, last: &Submission) -> anyhow::Result<Submission> {
    let origin: String = Input::with_theme(theme)
        .with_prompt("Origin City")
        .default(last.origin.clone())
        .interact_text()?;
    let destination: String = Input::with_theme(theme)
        .with_prompt("Destination City")
        .default(last.destination.clone())
        .interact_text()?;
    let deep_search = Confirm::with_theme(theme)
        .with_prompt("Deep Search (scrape top results for details)")
        .default(last.deep_search)
        .interact()?;

    Ok(Submission {
        origin,
        destination,
        deep_search,
    })
}

/// Print a finished cycle, either the report or the error in its place
pub fn print_outcome(outcome: &Result<DealReport, PipelineError>) {
    match outcome {
        Ok(report) => print_report(report),
        Err(err) => {
            tracing::debug!(error = %err, "cycle failed");
            eprintln!("{}", render_error(err).red());
        }
    }
}

pub fn print_report(report: &DealReport) {
    println!("\n{}\n", "Flight Deals Summary".bold().underline());
    println!("{}", report.summary);
    println!("\n{}\n", "Top Result Details (Scraped)".bold().underline());
    println!("{}", report.deep_details);
    println!("\n{}", format!("⏱️ {}", report.elapsed_text()).dimmed());
}

/// One combined message with the full cause chain
pub fn render_error(err: &PipelineError) -> String {
    format!("Error: {}", error_trace(err))
}
