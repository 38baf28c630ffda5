// src/cli.rs
// =============================================================================
// Command-line interface, parsed with clap's derive API.
//
// Usage:
//   seedcrawl https://example.com/ https://example.org/ --max-depth 3
//   seedcrawl --seeds-file seeds.txt --save-html --json
//
// The parsed arguments are turned into an immutable CrawlConfig; nothing
// else in the program reads the command line.
// =============================================================================

use crate::config::{
    CrawlConfig, DEFAULT_BATCH_SIZE, DEFAULT_BLACKLIST, DEFAULT_MAX_DEPTH, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "seedcrawl",
    version,
    about = "Breadth-first crawler that reports page titles, sizes and status codes per seed",
    long_about = "seedcrawl walks every seed website breadth-first, staying on the seed's own \
                  origin, and records the title, status code and size of every page it reaches. \
                  Results are written to one results.json per seed."
)]
pub struct Cli {
    /// Seed URLs to crawl (e.g., https://example.com/)
    pub seeds: Vec<String>,

    /// Read more seed URLs from a file, one per line ('#' starts a comment)
    #[arg(long, value_name = "PATH")]
    pub seeds_file: Option<PathBuf>,

    /// Number of breadth-first rounds per seed
    ///
    /// Depth 1 = just the seed
    /// Depth 2 = the seed + every page it links to
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// How many pages are fetched concurrently
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Skip URLs whose path ends with this suffix (repeatable)
    ///
    /// Replaces the default list (.jpg .png .jpeg .pdf .php) when given.
    #[arg(long = "blacklist", value_name = "SUFFIX")]
    pub blacklist: Vec<String>,

    /// Archive the raw HTML of every fetched page
    #[arg(long)]
    pub save_html: bool,

    /// Where raw pages are archived
    #[arg(long, default_value = "./html_pages")]
    pub html_dir: PathBuf,

    /// Where results.json files are written
    #[arg(long, default_value = "./results")]
    pub results_dir: PathBuf,

    /// Don't write results.json files
    #[arg(long)]
    pub no_store: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn to_config(&self) -> CrawlConfig {
        let blacklist = if self.blacklist.is_empty() {
            DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect()
        } else {
            self.blacklist.clone()
        };

        CrawlConfig {
            batch_size: self.batch_size,
            blacklist,
            save_raw_html: self.save_html,
            store_results: !self.no_store,
            fetch_timeout: Duration::from_secs(self.timeout),
            user_agent: self.user_agent.clone(),
            results_dir: self.results_dir.clone(),
            html_dir: self.html_dir.clone(),
            ..CrawlConfig::with_max_depth(self.max_depth)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["seedcrawl", "https://example.com/"]).unwrap();
        assert_eq!(cli.seeds, vec!["https://example.com/"]);
        assert_eq!(cli.to_config(), CrawlConfig::default());
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "seedcrawl",
            "https://a.com/",
            "https://b.com/",
            "--max-depth",
            "3",
            "--batch-size",
            "10",
            "--blacklist",
            ".zip",
            "--blacklist",
            ".gif",
            "--save-html",
            "--no-store",
            "--timeout",
            "30",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.seeds.len(), 2);
        assert!(cli.json);

        let config = cli.to_config();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.blacklist, vec![".zip", ".gif"]);
        assert!(config.save_raw_html);
        assert!(!config.store_results);
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_seeds_file_only() {
        let cli = Cli::try_parse_from(["seedcrawl", "--seeds-file", "seeds.txt"]).unwrap();
        assert!(cli.seeds.is_empty());
        assert_eq!(cli.seeds_file, Some(PathBuf::from("seeds.txt")));
    }

    #[test]
    fn test_rejects_non_numeric_depth() {
        assert!(Cli::try_parse_from(["seedcrawl", "https://a.com/", "--max-depth", "deep"]).is_err());
    }
}
