// src/crawl/orchestrator.rs
// =============================================================================
// The crawler: breadth-first traversal of one seed at a time.
//
// How one seed is crawled:
// 1. Start with the seed as the only URL in the frontier (depth 0)
// 2. Mark the whole frontier visited, then fetch it in concurrent batches
// 3. Record every result (status histogram + page record)
// 4. Pool the links found by every page of the round
// 5. Filter them into the next frontier (unvisited, same origin, not
//    blacklisted)
// 6. Go one level deeper; stop at max_depth or when nothing is left
//
// max_depth counts rounds: max_depth = 2 fetches the seed and the pages it
// links to, and whatever those pages link to is left in the frontier.
//
// Rounds are strictly sequential: depth d+1 starts only when every fetch of
// depth d is done, since its frontier is built from all of them.
//
// Seeds share nothing and are crawled one after the other. Each finished
// seed is handed to storage before the next one starts.
// =============================================================================

use crate::config::CrawlConfig;
use crate::crawl::events::{CrawlEvent, CrawlObserver, TracingObserver};
use crate::crawl::state::SeedCrawl;
use crate::error::ConfigError;
use crate::fetch::{BatchDispatcher, FetchResult, Fetcher};
use crate::storage::Storage;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

pub struct Crawler<F> {
    config: CrawlConfig,
    fetcher: F,
    dispatcher: BatchDispatcher,
    storage: Option<Storage>,
    observer: Arc<dyn CrawlObserver>,
}

impl<F: Fetcher> Crawler<F> {
    pub fn new(config: CrawlConfig, fetcher: F) -> Result<Self, ConfigError> {
        config.validate()?;
        let dispatcher = BatchDispatcher::from_config(&config);

        Ok(Self {
            config,
            fetcher,
            dispatcher,
            storage: None,
            observer: Arc::new(TracingObserver),
        })
    }

    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn CrawlObserver>) -> Self {
        self.observer = observer;
        self
    }

    fn emit(&self, event: CrawlEvent) {
        self.observer.on_event(&event);
    }

    // Crawls every seed in order and returns their finished states
    pub async fn process_all(&self, seeds: &[Url]) -> Vec<SeedCrawl> {
        let mut crawls = Vec::with_capacity(seeds.len());
        for seed in seeds {
            crawls.push(self.process_seed(seed).await);
        }
        crawls
    }

    // Runs the BFS for a single seed until it is Done
    //
    // Never fails: unreachable pages (even an unreachable seed) are recorded
    // in the error bucket and the crawl still finishes with a valid state.
    pub async fn process_seed(&self, seed: &Url) -> SeedCrawl {
        let start = Instant::now();
        let folder = Storage::seed_folder(seed);

        let mut crawl = SeedCrawl::new(seed.clone(), &self.config);
        crawl.begin();
        self.emit(CrawlEvent::SeedStarted {
            seed: seed.clone(),
            max_depth: crawl.max_depth(),
        });

        let mut more_rounds = crawl.should_continue();
        while more_rounds {
            let depth = crawl.current_depth();
            let frontier = crawl.frontier().to_vec();
            self.emit(CrawlEvent::RoundStarted {
                seed: seed.clone(),
                depth,
                frontier: frontier.len(),
            });

            // Before dispatch, so a URL seen twice in this round is fetched once
            crawl.mark_visited(&frontier);

            let results = self.dispatcher.dispatch(&self.fetcher, &frontier).await;

            let mut candidates: HashSet<Url> = HashSet::new();
            for result in &results {
                if let Some(error) = &result.error {
                    self.emit(CrawlEvent::FetchFailed {
                        url: result.url.clone(),
                        error: error.to_string(),
                    });
                }

                if crawl.record_fetch(result) {
                    self.archive_raw_page(&folder, result).await;
                } else {
                    self.emit(CrawlEvent::DuplicatePage {
                        url: result.url.clone(),
                        final_url: result.final_url.clone(),
                    });
                }

                candidates.extend(result.links.iter().cloned());
            }

            let next_frontier = crawl.next_frontier(&candidates).len();
            self.emit(CrawlEvent::RoundFinished {
                seed: seed.clone(),
                depth,
                fetched: results.len(),
                candidates: candidates.len(),
                next_frontier,
            });

            more_rounds = crawl.advance_depth() && !crawl.frontier().is_empty();
        }

        let elapsed = start.elapsed();
        crawl.finish(elapsed);
        self.emit(CrawlEvent::SeedFinished {
            seed: seed.clone(),
            pages: crawl.pages_fetched(),
            depth: crawl.current_depth(),
            elapsed,
        });

        self.store_results(&folder, &crawl).await;
        crawl
    }

    async fn archive_raw_page(&self, folder: &str, result: &FetchResult) {
        if !self.config.save_raw_html || !result.is_ok() {
            return;
        }
        let Some(storage) = &self.storage else {
            return;
        };

        if let Err(e) = storage
            .store_raw_page(folder, &result.final_url, &result.content)
            .await
        {
            self.emit(CrawlEvent::RawPageFailed {
                url: result.final_url.clone(),
                error: format!("{:#}", e),
            });
        }
    }

    async fn store_results(&self, folder: &str, crawl: &SeedCrawl) {
        if !self.config.store_results {
            return;
        }
        let Some(storage) = &self.storage else {
            return;
        };

        let event = match storage.store_results(folder, crawl.results()).await {
            Ok(path) => CrawlEvent::ResultsStored {
                seed: crawl.seed().clone(),
                path: path.display().to_string(),
            },
            Err(e) => CrawlEvent::ResultsFailed {
                seed: crawl.seed().clone(),
                error: format!("{:#}", e),
            },
        };
        self.emit(event);
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why rounds instead of a single queue?
//    - A queue pops one URL at a time, so fetches happen one by one
//    - A round takes the whole depth level and fetches it concurrently
//    - The next level can only be computed once every page of this level
//      has been seen, so rounds never overlap
//
// 2. Why is the Crawler generic over F: Fetcher?
//    - In production F is HttpFetcher (real network)
//    - In tests F is an in-memory fake site, so tests are fast and offline
//    - Generics are resolved at compile time: no runtime cost
//
// 3. Why Arc<dyn CrawlObserver>?
//    - The observer is chosen at runtime (tracing, or a recorder in tests)
//    - `dyn Trait` is a trait object; Arc lets the caller keep a handle too
//
// 4. What is `let Some(x) = .. else { return; };`?
//    - let-else: bind the value if the pattern matches, otherwise run the
//      else block, which must leave the function (return, break, ...)
// -----------------------------------------------------------------------------
