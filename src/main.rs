// src/main.rs
// =============================================================================
// Entry point of the seedcrawl CLI.
//
// What happens here:
// 1. Set up logging (tracing, filtered by RUST_LOG, written to stderr)
// 2. Parse command-line arguments and build the crawl configuration
// 3. Crawl every seed, one after the other
// 4. Print the report and exit with a meaningful code:
//      0 = every seed answered
//      1 = at least one seed produced no successful fetch
//      2 = configuration or I/O error, nothing (or not everything) crawled
// =============================================================================

mod cli;
mod config;
mod crawl;
mod error;
mod fetch;
mod report;
mod storage;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use crawl::{Crawler, TracingObserver};
use fetch::HttpFetcher;
use report::RunSummary;
use std::sync::Arc;
use storage::Storage;
use tracing::{error, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{:#}", e), "run aborted");
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// stderr only: stdout is reserved for the report (which may be JSON)
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seedcrawl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = cli.to_config();

    let seeds = config::parse_seeds(&collect_seeds(&cli).await?)?;
    let fetcher = HttpFetcher::new(&config)?;
    let crawler = Crawler::new(config.clone(), fetcher)?
        .with_storage(Storage::from_config(&config))
        .with_observer(Arc::new(TracingObserver));

    let crawls = crawler.process_all(&seeds).await;

    let summary = RunSummary::from_crawls(&crawls);
    report::log_summary(&summary);
    report::print_summary(&summary, cli.json)?;

    let unreachable = summary.unreachable_seeds();
    if unreachable.is_empty() {
        Ok(0)
    } else {
        warn!(seeds = ?unreachable, "some seeds could not be reached");
        Ok(1)
    }
}

// Positional seeds first, then the ones from --seeds-file
async fn collect_seeds(cli: &Cli) -> Result<Vec<String>> {
    let mut seeds = cli.seeds.clone();

    if let Some(path) = &cli.seeds_file {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read seeds file {}", path.display()))?;
        seeds.extend(config::parse_seed_file(&contents));
    }

    Ok(seeds)
}
