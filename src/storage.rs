// src/storage.rs
// =============================================================================
// Writes crawl output to disk.
//
// Layout (one folder per seed, named after its host with '.' -> '_'):
//
//   <html_dir>/<example_com>/<example_com>__<_docs_intro>.html   raw pages
//   <results_dir>/<example_com>/results.json                     page records
//
// Raw pages are only written when --save-html is on.
// =============================================================================

use crate::config::CrawlConfig;
use crate::crawl::PageRecord;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone)]
pub struct Storage {
    results_dir: PathBuf,
    html_dir: PathBuf,
}

impl Storage {
    pub fn new(results_dir: impl Into<PathBuf>, html_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
            html_dir: html_dir.into(),
        }
    }

    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(&config.results_dir, &config.html_dir)
    }

    // Folder name for everything that belongs to one seed
    //
    //   https://www.example.com/     -> "www_example_com"
    //   http://localhost:8080/       -> "localhost_8080"
    pub fn seed_folder(seed: &Url) -> String {
        let host = host_name(seed);
        match seed.port() {
            Some(port) => format!("{}_{}", host, port),
            None => host,
        }
    }

    // File name for an archived page
    //
    //   https://example.com/docs/intro -> "example_com___docs_intro.html"
    pub fn raw_page_name(url: &Url) -> String {
        format!("{}__{}.html", host_name(url), url.path().replace('/', "_"))
    }

    pub async fn store_raw_page(&self, folder: &str, url: &Url, content: &[u8]) -> Result<PathBuf> {
        let dir = self.html_dir.join(folder);
        let path = dir.join(Self::raw_page_name(url));
        write_file(&dir, &path, content).await?;
        Ok(path)
    }

    pub async fn store_results(
        &self,
        folder: &str,
        results: &BTreeMap<String, PageRecord>,
    ) -> Result<PathBuf> {
        let dir = self.results_dir.join(folder);
        let path = dir.join("results.json");
        let json = serde_json::to_vec_pretty(results).context("Failed to serialize results")?;
        write_file(&dir, &path, &json).await?;
        Ok(path)
    }
}

fn host_name(url: &Url) -> String {
    url.host_str().unwrap_or("unknown").replace('.', "_")
}

async fn write_file(dir: &Path, path: &Path, content: &[u8]) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
