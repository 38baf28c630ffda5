// src/fetch/dispatch.rs
// =============================================================================
// Batch dispatcher: fetch a list of URLs, `batch_size` at a time.
//
// How it works:
// 1. Split the URL list into contiguous chunks of at most `batch_size`
// 2. Start every fetch of a chunk at once
// 3. Wait until the whole chunk is done (fan-in), then move to the next one
//
// Results come back chunk by chunk, but inside a chunk they are in whatever
// order the fetches finished.
//
// Every fetch is wrapped in a timeout. The transport has its own timeout,
// this one only makes sure a misbehaving fetch can't hold the batch hostage.
//
// Rust concepts:
// - Streams: stream::iter turns a slice into an async sequence
// - buffer_unordered: bounded concurrency over that sequence
// - tokio::time::timeout: races a future against a timer
// =============================================================================

use crate::config::CrawlConfig;
use crate::error::FetchError;
use crate::fetch::http::{FetchResult, Fetcher};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

// Extra time on top of the transport timeout before we give up on a fetch
const FETCH_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct BatchDispatcher {
    batch_size: usize,
    fetch_timeout: Duration,
}

impl BatchDispatcher {
    pub fn new(batch_size: usize, fetch_timeout: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            fetch_timeout,
        }
    }

    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(config.batch_size, config.fetch_timeout + FETCH_GRACE)
    }

    // Fetches every URL and returns one result per URL
    //
    // Never fails as a whole: a URL that errors or times out shows up as a
    // FetchResult with its `error` set.
    pub async fn dispatch<F>(&self, fetcher: &F, urls: &[Url]) -> Vec<FetchResult>
    where
        F: Fetcher + ?Sized,
    {
        let batches = urls.len().div_ceil(self.batch_size);
        let mut results = Vec::with_capacity(urls.len());

        for (index, batch) in urls.chunks(self.batch_size).enumerate() {
            debug!(batch = index + 1, batches, size = batch.len(), "dispatching batch");

            let batch_results: Vec<FetchResult> = stream::iter(batch)
                .map(|url| self.fetch_guarded(fetcher, url))
                .buffer_unordered(batch.len())
                .collect()
                .await;

            results.extend(batch_results);
        }

        results
    }

    async fn fetch_guarded<F>(&self, fetcher: &F, url: &Url) -> FetchResult
    where
        F: Fetcher + ?Sized,
    {
        match tokio::time::timeout(self.fetch_timeout, fetcher.fetch(url)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(url = %url, timeout = ?self.fetch_timeout, "fetch did not resolve in time");
                FetchResult::failed(url, FetchError::Timeout)
            }
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does buffer_unordered(n) do here?
//    - It polls up to n fetch futures at the same time
//    - Results are yielded as soon as each one finishes, in any order
//    - We pass the batch length, so the whole batch runs at once and
//      .collect().await only returns when every fetch of it is done
//
// 2. Why a `for` loop over chunks instead of one big stream?
//    - One big buffer_unordered(batch_size) would start fetch 101 as soon
//      as fetch 1 finishes
//    - The loop waits for the whole chunk, so batches never overlap
//
// 3. How does tokio::time::timeout work?
//    - timeout(d, fut) resolves to Ok(output) if fut finishes within d
//    - Otherwise it drops fut (cancelling it) and resolves to Err(Elapsed)
//    - Dropping a future is how cancellation works in async Rust
//
// 4. Why `F: Fetcher + ?Sized`?
//    - ?Sized also accepts trait objects like `dyn Fetcher`, not just
//      concrete types
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Records how many fetches run at the same time
    #[derive(Default)]
    struct CountingFetcher {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl Fetcher for CountingFetcher {
        async fn fetch(&self, url: &Url) -> FetchResult {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            FetchResult {
                url: url.clone(),
                final_url: url.clone(),
                status_code: Some(200),
                content: Vec::new(),
                title: None,
                links: Vec::new(),
                error: None,
            }
        }
    }

    // Fails on "/bad", never answers on "/hang", succeeds otherwise
    struct FlakyFetcher;

    #[async_trait]
    impl Fetcher for FlakyFetcher {
        async fn fetch(&self, url: &Url) -> FetchResult {
            match url.path() {
                "/bad" => FetchResult::failed(url, FetchError::Connect("refused".to_string())),
                "/hang" => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
                _ => FetchResult {
                    url: url.clone(),
                    final_url: url.clone(),
                    status_code: Some(200),
                    content: b"ok".to_vec(),
                    title: None,
                    links: Vec::new(),
                    error: None,
                },
            }
        }
    }

    fn urls(n: usize) -> Vec<Url> {
        (0..n)
            .map(|i| Url::parse(&format!("https://example.com/{}", i)).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_batches_are_bounded_and_in_order() {
        let fetcher = CountingFetcher::default();
        let dispatcher = BatchDispatcher::new(3, Duration::from_secs(5));
        let input = urls(7);

        let results = dispatcher.dispatch(&fetcher, &input).await;

        assert_eq!(results.len(), 7);
        assert_eq!(fetcher.max_in_flight.load(Ordering::SeqCst), 3);

        // Each batch's results stay inside that batch's slot
        for (chunk_in, chunk_out) in input.chunks(3).zip(results.chunks(3)) {
            let expected: HashSet<_> = chunk_in.iter().collect();
            let got: HashSet<_> = chunk_out.iter().map(|r| &r.url).collect();
            assert_eq!(expected, got);
        }
    }

    #[tokio::test]
    async fn test_empty_input() {
        let dispatcher = BatchDispatcher::new(100, Duration::from_secs(5));
        let results = dispatcher.dispatch(&FlakyFetcher, &[]).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_failures_do_not_affect_siblings() {
        let dispatcher = BatchDispatcher::new(100, Duration::from_millis(100));
        let input: Vec<Url> = ["/ok", "/bad", "/hang", "/also-ok"]
            .iter()
            .map(|p| Url::parse(&format!("https://example.com{}", p)).unwrap())
            .collect();

        let results = dispatcher.dispatch(&FlakyFetcher, &input).await;
        assert_eq!(results.len(), 4);

        let by_path = |path: &str| results.iter().find(|r| r.url.path() == path).unwrap();
        assert!(by_path("/ok").is_ok());
        assert!(by_path("/also-ok").is_ok());
        assert_eq!(
            by_path("/bad").error,
            Some(FetchError::Connect("refused".to_string()))
        );
        assert_eq!(by_path("/hang").error, Some(FetchError::Timeout));
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        assert_eq!(BatchDispatcher::new(0, Duration::from_secs(1)).batch_size, 1);
    }
}
