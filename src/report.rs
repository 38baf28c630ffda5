// src/report.rs
// =============================================================================
// Turns finished crawls into reports.
//
// Per seed: pages visited, status code distribution (in percent), time taken.
// For the whole run: total time and total pages over all seeds.
//
// Output goes to stdout either as a human-readable table or as JSON (--json).
// The same summary is also logged so it ends up next to the crawl events.
// =============================================================================

use crate::crawl::{CrawlPhase, SeedCrawl};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedReport {
    pub seed: String,
    /// scheme://host[:port] the crawl was confined to
    pub origin: String,
    /// Pages fetched, failed fetches included
    pub total_visited: usize,
    /// Fetches that got an HTTP response
    pub successful: usize,
    /// URLs seen and accepted into a frontier, fetched or not
    pub discovered: usize,
    pub depth_reached: usize,
    /// Status code (or "error") -> number of pages
    pub status_counts: BTreeMap<String, usize>,
    /// Status code (or "error") -> percent of total_visited
    pub status: BTreeMap<String, f64>,
    pub elapsed_secs: f64,
}

impl SeedReport {
    pub fn from_crawl(crawl: &SeedCrawl) -> Self {
        debug_assert_eq!(crawl.phase(), CrawlPhase::Done);
        Self {
            seed: crawl.seed().to_string(),
            origin: crawl.origin().ascii_serialization(),
            total_visited: crawl.pages_fetched(),
            successful: crawl.successful_fetches(),
            discovered: crawl.visited().len(),
            depth_reached: crawl.current_depth(),
            status_counts: crawl
                .status_histogram()
                .iter()
                .map(|(class, count)| (class.to_string(), *count))
                .collect(),
            status: crawl
                .status_percentages()
                .into_iter()
                .map(|(class, percent)| (class.to_string(), percent))
                .collect(),
            elapsed_secs: crawl.elapsed().map(|d| d.as_secs_f64()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_elapsed_secs: f64,
    pub total_visited: usize,
    pub seeds: Vec<SeedReport>,
}

impl RunSummary {
    pub fn from_crawls(crawls: &[SeedCrawl]) -> Self {
        let seeds: Vec<SeedReport> = crawls.iter().map(SeedReport::from_crawl).collect();
        Self {
            total_elapsed_secs: seeds.iter().map(|s| s.elapsed_secs).sum(),
            total_visited: seeds.iter().map(|s| s.total_visited).sum(),
            seeds,
        }
    }

    /// Seeds where not a single fetch got a response.
    pub fn unreachable_seeds(&self) -> Vec<&str> {
        self.seeds
            .iter()
            .filter(|s| s.successful == 0)
            .map(|s| s.seed.as_str())
            .collect()
    }
}

pub fn log_summary(summary: &RunSummary) {
    info!(
        total_elapsed_secs = summary.total_elapsed_secs,
        total_visited = summary.total_visited,
        seeds = summary.seeds.len(),
        "run finished"
    );
    for seed in &summary.seeds {
        info!(
            seed = %seed.seed,
            total_visited = seed.total_visited,
            discovered = seed.discovered,
            status = ?seed.status,
            elapsed_secs = seed.elapsed_secs,
            "seed report"
        );
    }
}

// Prints the summary as JSON or as a table
pub fn print_summary(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        print!("{}", format_table(summary));
    }
    Ok(())
}

fn format_table(summary: &RunSummary) -> String {
    let mut out = String::new();

    for seed in &summary.seeds {
        let _ = writeln!(out, "{}", "-".repeat(80));
        let _ = writeln!(out, "Url: {}", seed.seed);
        let _ = writeln!(out, "Total pages visited: {}", seed.total_visited);
        let _ = writeln!(out, "Depth reached: {}", seed.depth_reached);
        let _ = writeln!(out, "Status codes:");
        for (status, percent) in &seed.status {
            let count = seed.status_counts.get(status).copied().unwrap_or_default();
            let _ = writeln!(out, "    {:<8} {:>6.2}%  ({})", status, percent, count);
        }
        let _ = writeln!(out, "Took {:.2}s", seed.elapsed_secs);
    }

    let _ = writeln!(out, "{}", "=".repeat(80));
    let _ = writeln!(
        out,
        "Crawled {} seed(s) in {:.2}s, {} page(s) visited",
        summary.seeds.len(),
        summary.total_elapsed_secs,
        summary.total_visited
    );
    out
}
