// src/crawl/state.rs
// =============================================================================
// Per-seed crawl state.
//
// One SeedCrawl exists per seed URL and is owned by the crawler driving that
// seed. It tracks:
// - which pages were visited (fetched or queued for fetching), by page key
// - the current frontier and BFS depth
// - one PageRecord per fetched page
// - a histogram of status codes (failed fetches go in the `error` bucket)
// - how long the crawl took, set once at the end
//
// Invariants kept by this type:
// - 0 <= current_depth <= max_depth
// - the histogram counts sum to the number of page records
// - a page in `visited` never comes back through next_frontier()
//
// Rust concepts:
// - Methods taking &mut self: only the owner can change the state
// - Enums with data: StatusClass::Http(404) vs StatusClass::Failed
// - Derived Ord: lets StatusClass be a BTreeMap key
// =============================================================================

use crate::config::CrawlConfig;
use crate::crawl::filter::{filter_links, normalize, strip_fragment};
use crate::fetch::FetchResult;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::time::Duration;
use url::{Origin, Url};

/// Histogram bucket for one fetch outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusClass {
    Http(u16),
    /// No HTTP status: timeout, refused connection, ...
    Failed,
}

impl StatusClass {
    pub fn of(result: &FetchResult) -> Self {
        match (result.status_code, &result.error) {
            (Some(code), None) => StatusClass::Http(code),
            _ => StatusClass::Failed,
        }
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusClass::Http(code) => write!(f, "{}", code),
            StatusClass::Failed => write!(f, "error"),
        }
    }
}

/// What we keep about each fetched page. Serialized into results.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub title: Option<String>,
    pub status_code: Option<u16>,
    pub bytes: usize,
    /// Set when the request was redirected somewhere outside the seed origin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Pending,
    Running,
    Done,
}

#[derive(Debug, Clone)]
pub struct SeedCrawl {
    seed: Url,
    origin: Origin,
    max_depth: usize,
    blacklist: Vec<String>,
    current_depth: usize,
    visited: HashSet<Url>,
    frontier: Vec<Url>,
    status_histogram: BTreeMap<StatusClass, usize>,
    results: BTreeMap<String, PageRecord>,
    elapsed: Option<Duration>,
    phase: CrawlPhase,
}

impl SeedCrawl {
    pub fn new(seed: Url, config: &CrawlConfig) -> Self {
        let origin = seed.origin();
        Self {
            seed,
            origin,
            max_depth: config.max_depth,
            blacklist: config.blacklist.clone(),
            current_depth: 0,
            visited: HashSet::new(),
            frontier: Vec::new(),
            status_histogram: BTreeMap::new(),
            results: BTreeMap::new(),
            elapsed: None,
            phase: CrawlPhase::Pending,
        }
    }

    // Pending -> Running: the frontier starts out as just the seed
    pub fn begin(&mut self) {
        debug_assert_eq!(self.phase, CrawlPhase::Pending);
        self.phase = CrawlPhase::Running;
        self.current_depth = 0;
        self.visited.clear();
        self.frontier = vec![strip_fragment(&self.seed)];
    }

    // Running -> Done. After this the crawl is read-only.
    pub fn finish(&mut self, elapsed: Duration) {
        debug_assert_eq!(self.phase, CrawlPhase::Running);
        self.elapsed = Some(elapsed);
        self.phase = CrawlPhase::Done;
    }

    /// Loop guard for the BFS: depth budget left and something to fetch.
    pub fn should_continue(&self) -> bool {
        self.phase == CrawlPhase::Running
            && self.current_depth < self.max_depth
            && !self.frontier.is_empty()
    }

    pub fn mark_visited(&mut self, urls: &[Url]) {
        self.visited.extend(urls.iter().map(normalize));
    }

    // Records one fetch outcome
    //
    // The page is stored under its final URL when the redirect stayed inside
    // the seed origin, otherwise under the URL that was requested. If two
    // requests ended up on the same page, only the first one counts.
    //
    // Returns false when the result was a duplicate and was dropped.
    pub fn record_fetch(&mut self, result: &FetchResult) -> bool {
        let requested = strip_fragment(&result.url);
        let landed = strip_fragment(&result.final_url);

        let (key, redirected_off_origin) = if landed.origin() == self.origin {
            self.visited.insert(normalize(&landed));
            (landed, false)
        } else {
            (requested, true)
        };

        let key = key.to_string();
        if self.results.contains_key(&key) {
            return false;
        }

        *self.status_histogram.entry(StatusClass::of(result)).or_insert(0) += 1;
        self.results.insert(
            key,
            PageRecord {
                title: result.title.clone(),
                status_code: result.status_code,
                bytes: result.content.len(),
                final_url: redirected_off_origin.then(|| result.final_url.to_string()),
                error: result.error.as_ref().map(|e| e.to_string()),
            },
        );
        true
    }

    // Filters the round's candidate links into the next frontier.
    // Everything that makes it in is marked visited straight away.
    pub fn next_frontier<'a, I>(&mut self, candidates: I) -> &[Url]
    where
        I: IntoIterator<Item = &'a Url>,
    {
        let next = filter_links(candidates, &self.visited, &self.origin, &self.blacklist);
        self.visited.extend(next.iter().map(normalize));
        self.frontier = next.into_iter().collect();
        &self.frontier
    }

    // Moves to the next depth and says whether another round is allowed
    pub fn advance_depth(&mut self) -> bool {
        debug_assert!(self.current_depth < self.max_depth);
        self.current_depth += 1;
        self.current_depth < self.max_depth
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn current_depth(&self) -> usize {
        self.current_depth
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn frontier(&self) -> &[Url] {
        &self.frontier
    }

    pub fn visited(&self) -> &HashSet<Url> {
        &self.visited
    }

    pub fn results(&self) -> &BTreeMap<String, PageRecord> {
        &self.results
    }

    pub fn status_histogram(&self) -> &BTreeMap<StatusClass, usize> {
        &self.status_histogram
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Number of recorded fetches, failed ones included.
    pub fn pages_fetched(&self) -> usize {
        self.status_histogram.values().sum()
    }

    pub fn successful_fetches(&self) -> usize {
        self.status_histogram
            .iter()
            .filter(|(class, _)| **class != StatusClass::Failed)
            .map(|(_, count)| count)
            .sum()
    }

    /// Share of each status bucket, in percent of all recorded fetches.
    pub fn status_percentages(&self) -> BTreeMap<StatusClass, f64> {
        let total = self.pages_fetched();
        if total == 0 {
            return BTreeMap::new();
        }
        self.status_histogram
            .iter()
            .map(|(class, count)| (*class, *count as f64 * 100.0 / total as f64))
            .collect()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why BTreeMap for the histogram and the results?
//    - A BTreeMap keeps its keys sorted, a HashMap doesn't
//    - results.json and the report then list pages and status codes in the
//      same order on every run, which makes them easy to diff
//
// 2. Why is `visited` a HashSet then?
//    - It is only ever asked "is this page in there?", never listed
//    - HashSet answers that in O(1) and its order doesn't matter
//
// 3. Why are the fields private?
//    - The invariants above only hold if every change goes through the
//      methods, so callers get read-only accessors instead of `pub` fields
//
// 4. What is `bool::then`?
//    - cond.then(|| value) gives Some(value) when cond is true, else None
//    - Handy for optional fields like `final_url`
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn ok(requested: &str, landed: &str, status: u16) -> FetchResult {
        FetchResult {
            url: url(requested),
            final_url: url(landed),
            status_code: Some(status),
            content: vec![0; 42],
            title: Some("Title".to_string()),
            links: Vec::new(),
            error: None,
        }
    }

    fn running(max_depth: usize) -> SeedCrawl {
        let mut crawl = SeedCrawl::new(
            url("https://example.com/"),
            &CrawlConfig::with_max_depth(max_depth),
        );
        crawl.begin();
        crawl
    }

    #[test]
    fn test_begin_sets_up_seed_frontier() {
        let crawl = running(2);
        assert_eq!(crawl.phase(), CrawlPhase::Running);
        assert_eq!(crawl.frontier(), &[url("https://example.com/")]);
        assert_eq!(crawl.current_depth(), 0);
        assert!(crawl.should_continue());
    }

    #[test]
    fn test_record_fetch() {
        let mut crawl = running(1);
        assert!(crawl.record_fetch(&ok("https://example.com/", "https://example.com/", 200)));

        let record = &crawl.results()["https://example.com/"];
        assert_eq!(record.status_code, Some(200));
        assert_eq!(record.bytes, 42);
        assert_eq!(record.title.as_deref(), Some("Title"));
        assert_eq!(crawl.status_histogram()[&StatusClass::Http(200)], 1);
    }

    #[test]
    fn test_failed_fetch_goes_to_error_bucket() {
        let mut crawl = running(1);
        let failed = FetchResult::failed(&url("https://example.com/"), FetchError::Timeout);
        crawl.record_fetch(&failed);

        assert_eq!(crawl.status_histogram()[&StatusClass::Failed], 1);
        let record = &crawl.results()["https://example.com/"];
        assert_eq!(record.status_code, None);
        assert_eq!(record.error.as_deref(), Some("request timed out"));
        assert_eq!(crawl.successful_fetches(), 0);
    }

    #[test]
    fn test_broken_body_keeps_known_status() {
        let mut crawl = running(1);
        let broken = FetchResult {
            status_code: Some(200),
            ..FetchResult::failed(
                &url("https://example.com/"),
                FetchError::Body("connection closed".to_string()),
            )
        };
        crawl.record_fetch(&broken);

        assert_eq!(crawl.status_histogram()[&StatusClass::Failed], 1);
        let record = &crawl.results()["https://example.com/"];
        assert_eq!(record.status_code, Some(200));
        assert!(record.error.is_some());
    }

    #[test]
    fn test_redirects_onto_same_page_count_once() {
        let mut crawl = running(2);
        assert!(crawl.record_fetch(&ok("https://example.com/old", "https://example.com/new", 200)));
        assert!(!crawl.record_fetch(&ok("https://example.com/older", "https://example.com/new", 200)));

        assert_eq!(crawl.results().len(), 1);
        assert_eq!(crawl.pages_fetched(), 1);
        assert!(crawl.visited().contains(&url("https://example.com/new")));
    }

    #[test]
    fn test_off_origin_redirect_keyed_by_request() {
        let mut crawl = running(1);
        crawl.record_fetch(&ok("https://example.com/out", "https://other.com/landing", 200));

        let record = &crawl.results()["https://example.com/out"];
        assert_eq!(record.final_url.as_deref(), Some("https://other.com/landing"));
        assert!(!crawl.visited().contains(&url("https://other.com/landing")));
    }

    #[test]
    fn test_next_frontier_marks_visited() {
        let mut crawl = running(3);
        let frontier = crawl.frontier().to_vec();
        crawl.mark_visited(&frontier);

        let candidates = vec![
            url("https://example.com/b"),
            url("https://example.com/a"),
            url("https://example.com/"),
        ];
        let next = crawl.next_frontier(&candidates).to_vec();
        assert_eq!(next, vec![url("https://example.com/a"), url("https://example.com/b")]);
        assert!(crawl.visited().contains(&url("https://example.com/a")));

        // Same candidates again: nothing new
        assert!(crawl.next_frontier(&candidates).is_empty());
        assert!(!crawl.should_continue());
    }

    #[test]
    fn test_query_pages_are_keyed_as_fetched() {
        let mut crawl = running(2);
        crawl.record_fetch(&ok(
            "https://example.com/list?page=2",
            "https://example.com/list?page=2#top",
            200,
        ));

        assert!(crawl.results().contains_key("https://example.com/list?page=2"));
        // The page itself counts as visited, whatever the query
        assert!(crawl.visited().contains(&url("https://example.com/list")));
        assert!(crawl
            .next_frontier(&[url("https://example.com/list?page=3")])
            .is_empty());
    }

    #[test]
    fn test_advance_depth() {
        let mut crawl = running(2);
        assert!(crawl.advance_depth());
        assert!(!crawl.advance_depth());
        assert_eq!(crawl.current_depth(), 2);
        assert!(!crawl.should_continue());
    }

    #[test]
    fn test_status_percentages() {
        let mut crawl = running(1);
        crawl.record_fetch(&ok("https://example.com/1", "https://example.com/1", 200));
        crawl.record_fetch(&ok("https://example.com/2", "https://example.com/2", 200));
        crawl.record_fetch(&ok("https://example.com/3", "https://example.com/3", 200));
        crawl.record_fetch(&ok("https://example.com/4", "https://example.com/4", 404));

        let percentages = crawl.status_percentages();
        assert_eq!(percentages[&StatusClass::Http(200)], 75.0);
        assert_eq!(percentages[&StatusClass::Http(404)], 25.0);
    }

    #[test]
    fn test_finish_is_terminal() {
        let mut crawl = running(1);
        crawl.finish(Duration::from_millis(1500));
        assert_eq!(crawl.phase(), CrawlPhase::Done);
        assert_eq!(crawl.elapsed(), Some(Duration::from_millis(1500)));
        assert!(!crawl.should_continue());
    }

    #[test]
    fn test_status_class_display() {
        assert_eq!(StatusClass::Http(301).to_string(), "301");
        assert_eq!(StatusClass::Failed.to_string(), "error");
    }
}
