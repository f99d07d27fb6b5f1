//! Farefinder CLI - find and summarise flight deals
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments, wiring the providers and handling top-level errors.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use farefinder::{pipeline::PipelineSettings, ui, Config, Orchestrator, SearchRequest};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "farefinder")]
#[command(author, version, about = "Find and summarise flight deals", long_about = None)]
struct Cli {
    /// Path to a farefinder.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log provider requests and stage progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single search and print the report
    Find {
        /// Origin city
        origin: String,
        /// Destination city
        destination: String,
        /// Scrape the top results for booking details
        #[arg(long)]
        deep: bool,
        /// Maximum number of search results (defaults to the configured limit)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "farefinder",
                &mut std::io::stdout(),
            );
        }
        Some(Commands::Find {
            origin,
            destination,
            deep,
            limit,
        }) => {
            // Missing credentials stop us here, before any provider is called
            let mut config = Config::load(cli.config.as_deref())?;
            if let Some(limit) = limit {
                config.search.limit = limit;
            }
            let request = SearchRequest::with_limit(&origin, &destination, config.search.limit)?;
            let orchestrator = Orchestrator::from_config(&config)?;
            tracing::debug!(settings = ?PipelineSettings::from(&config), "one-shot search");

            let outcome = orchestrator.run_request(&request, deep).await;
            ui::print_outcome(&outcome);
            if outcome.is_err() {
                std::process::exit(1);
            }
        }
        None => {
            // Default: interactive session, refused up front without credentials
            let config = Config::load(cli.config.as_deref())?;
            let orchestrator = Orchestrator::from_config(&config)?;
            ui::run(&orchestrator).await?;
        }
    }

    Ok(())
}

/// Logs go to stderr so the markdown on stdout stays clean
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "farefinder=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
