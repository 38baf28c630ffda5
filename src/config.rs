// src/config.rs
// =============================================================================
// Crawl configuration.
//
// A CrawlConfig is built once per run (usually from the command line) and is
// never mutated afterwards. Every SeedCrawl takes its own copy of the pieces
// it needs, so no two crawls can ever share or change each other's settings.
// =============================================================================

use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_MAX_DEPTH: usize = 1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BLACKLIST: [&str; 5] = [".jpg", ".png", ".jpeg", ".pdf", ".php"];
pub const DEFAULT_USER_AGENT: &str = concat!("seedcrawl/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq)]
pub struct CrawlConfig {
    /// Number of BFS rounds per seed. Round 0 fetches only the seed.
    pub max_depth: usize,
    /// How many URLs are fetched concurrently at once
    pub batch_size: usize,
    /// Path suffixes that are never fetched
    pub blacklist: Vec<String>,
    /// Archive the raw body of every fetched page
    pub save_raw_html: bool,
    /// Write results.json for every seed once it is done
    pub store_results: bool,
    pub fetch_timeout: Duration,
    pub user_agent: String,
    pub results_dir: PathBuf,
    pub html_dir: PathBuf,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            batch_size: DEFAULT_BATCH_SIZE,
            blacklist: DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect(),
            save_raw_html: false,
            store_results: true,
            fetch_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            results_dir: PathBuf::from("./results"),
            html_dir: PathBuf::from("./html_pages"),
        }
    }
}

impl CrawlConfig {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    // Checks the numeric limits. Called before any crawl starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth < 1 {
            return Err(ConfigError::InvalidMaxDepth(self.max_depth));
        }
        if self.batch_size < 1 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }
        Ok(())
    }
}

// Parses the seed list into URLs
//
// All seeds are checked up front: one bad seed stops the run before any
// network traffic happens.
pub fn parse_seeds<S: AsRef<str>>(seeds: &[S]) -> Result<Vec<Url>, ConfigError> {
    if seeds.is_empty() {
        return Err(ConfigError::NoSeeds);
    }

    seeds
        .iter()
        .map(|seed| {
            let seed = seed.as_ref().trim();
            let url = Url::parse(seed).map_err(|e| ConfigError::InvalidSeed {
                seed: seed.to_string(),
                reason: e.to_string(),
            })?;

            match url.scheme() {
                "http" | "https" => {}
                _ => return Err(ConfigError::UnsupportedScheme(seed.to_string())),
            }

            if url.host_str().is_none() {
                return Err(ConfigError::InvalidSeed {
                    seed: seed.to_string(),
                    reason: "URL has no host".to_string(),
                });
            }

            Ok(url)
        })
        .collect()
}

// Reads a seed list file: one URL per line, '#' starts a comment
pub fn parse_seed_file(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
