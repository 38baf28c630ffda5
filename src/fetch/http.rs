// src/fetch/http.rs
// =============================================================================
// The transport: fetch one URL and turn the response into a FetchResult.
//
// Key points:
// - GET request with a per-request timeout and a bounded redirect policy
// - Status codes are data: a 404 is a successful fetch with status 404
// - Network failures (timeout, refused connection, ...) never escape as
//   errors. They come back as a FetchResult carrying a FetchError, so one
//   bad URL can't take its batch down with it.
// - HTML bodies are parsed for the title and outgoing links
//
// The crawler only talks to the `Fetcher` trait, which lets the tests swap
// in an in-memory site instead of the network.
//
// Rust concepts:
// - #[async_trait]: async fn in a trait used as a generic bound
// - Struct update syntax: `..FetchResult::failed(..)` fills the other fields
// =============================================================================

use crate::config::CrawlConfig;
use crate::error::FetchError;
use crate::fetch::html::{self, PageContent};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

/// Everything one fetch produced. Lives for a single round.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    /// The URL we asked for
    pub url: Url,
    /// Where we ended up after redirects
    pub final_url: Url,
    /// None when no response arrived at all
    pub status_code: Option<u16>,
    pub content: Vec<u8>,
    pub title: Option<String>,
    pub links: Vec<Url>,
    pub error: Option<FetchError>,
}

impl FetchResult {
    // A fetch that never got a usable response
    pub fn failed(url: &Url, error: FetchError) -> Self {
        Self {
            url: url.clone(),
            final_url: url.clone(),
            status_code: None,
            content: Vec::new(),
            title: None,
            links: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Fetches and parses a single URL.
///
/// Implementations must always resolve: failures are reported inside the
/// returned `FetchResult`, never by panicking or hanging forever.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> FetchResult;
}

// The real network transport
//
// reqwest::Client pools connections internally and is cheap to clone, so
// one HttpFetcher is shared by every fetch of the run.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> FetchResult {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(url = %url, error = %e, "request failed");
                return FetchResult::failed(url, FetchError::from_reqwest(&e));
            }
        };

        let final_url = response.url().clone();
        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // The headers already arrived, so a broken body still leaves us with
        // a status code and the final URL worth recording
        let content = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                debug!(url = %url, error = %e, "failed to read body");
                return FetchResult {
                    final_url,
                    status_code: Some(status_code),
                    ..FetchResult::failed(url, FetchError::from_reqwest(&e))
                };
            }
        };

        let page = if html::is_html(content_type.as_deref()) {
            // TODO: honour the charset from the content type instead of assuming UTF-8
            let body = String::from_utf8_lossy(&content);
            html::extract_page(&body, &final_url).unwrap_or_else(|e| {
                warn!(url = %final_url, error = %e, "could not parse page");
                PageContent::default()
            })
        } else {
            PageContent::default()
        };

        FetchResult {
            url: url.clone(),
            final_url,
            status_code: Some(status_code),
            content,
            title: page.title,
            links: page.links,
            error: None,
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does fetch() return FetchResult and not Result<FetchResult, _>?
//    - A dead link is an expected outcome of crawling, not a program error
//    - Keeping the error inside the result means the caller can't forget
//      to record it, and `?` can't accidentally abort a whole batch
//
// 2. Why is status_code an Option<u16>?
//    - None means no response came back at all (DNS, refused, timeout)
//    - Some(code) can still come with an error when the body broke halfway
//
// 3. What is String::from_utf8_lossy?
//    - Turns bytes into text, replacing invalid UTF-8 with '\u{FFFD}'
//    - It never fails, so a badly encoded page still gets its links parsed
// -----------------------------------------------------------------------------
