// src/crawl/events.rs
// =============================================================================
// Structured events emitted while crawling.
//
// The crawler doesn't log directly. It describes what happened as a
// CrawlEvent and hands it to a CrawlObserver. The default observer turns
// events into `tracing` records; tests use one that just collects them.
//
// Rust concepts:
// - Trait objects: the crawler holds an Arc<dyn CrawlObserver>
// - Structured fields: `url = %url` records the Display form as a field
// =============================================================================

#[cfg(test)]
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    SeedStarted {
        seed: Url,
        max_depth: usize,
    },
    RoundStarted {
        seed: Url,
        depth: usize,
        frontier: usize,
    },
    FetchFailed {
        url: Url,
        error: String,
    },
    /// A redirect landed on a page that was already recorded
    DuplicatePage {
        url: Url,
        final_url: Url,
    },
    RoundFinished {
        seed: Url,
        depth: usize,
        fetched: usize,
        candidates: usize,
        next_frontier: usize,
    },
    RawPageFailed {
        url: Url,
        error: String,
    },
    SeedFinished {
        seed: Url,
        pages: usize,
        depth: usize,
        elapsed: Duration,
    },
    ResultsStored {
        seed: Url,
        path: String,
    },
    ResultsFailed {
        seed: Url,
        error: String,
    },
}

pub trait CrawlObserver: Send + Sync {
    fn on_event(&self, event: &CrawlEvent);
}

/// Renders crawl events as tracing records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CrawlObserver for TracingObserver {
    fn on_event(&self, event: &CrawlEvent) {
        match event {
            CrawlEvent::SeedStarted { seed, max_depth } => {
                info!(seed = %seed, max_depth, "starting crawl");
            }
            CrawlEvent::RoundStarted { seed, depth, frontier } => {
                info!(seed = %seed, depth, urls = frontier, "processing round");
            }
            CrawlEvent::FetchFailed { url, error } => {
                warn!(url = %url, error = %error, "fetch failed");
            }
            CrawlEvent::DuplicatePage { url, final_url } => {
                debug!(url = %url, final_url = %final_url, "redirected onto an already recorded page");
            }
            CrawlEvent::RoundFinished {
                seed,
                depth,
                fetched,
                candidates,
                next_frontier,
            } => {
                info!(
                    seed = %seed,
                    depth,
                    fetched,
                    candidates,
                    next_frontier,
                    "round finished"
                );
            }
            CrawlEvent::RawPageFailed { url, error } => {
                warn!(url = %url, error = %error, "could not archive raw page");
            }
            CrawlEvent::SeedFinished {
                seed,
                pages,
                depth,
                elapsed,
            } => {
                info!(
                    seed = %seed,
                    pages,
                    depth,
                    elapsed_secs = elapsed.as_secs_f64(),
                    "crawl finished"
                );
            }
            CrawlEvent::ResultsStored { seed, path } => {
                info!(seed = %seed, path = %path, "results stored");
            }
            CrawlEvent::ResultsFailed { seed, error } => {
                warn!(seed = %seed, error = %error, "could not store results");
            }
        }
    }
}

// Keeps every event in memory, in order
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<CrawlEvent>>,
}

#[cfg(test)]
impl RecordingObserver {
    pub fn events(&self) -> Vec<CrawlEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
impl CrawlObserver for RecordingObserver {
    fn on_event(&self, event: &CrawlEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_keeps_order() {
        let observer = RecordingObserver::default();
        let seed = Url::parse("https://example.com/").unwrap();

        observer.on_event(&CrawlEvent::SeedStarted {
            seed: seed.clone(),
            max_depth: 2,
        });
        observer.on_event(&CrawlEvent::RoundStarted {
            seed,
            depth: 0,
            frontier: 1,
        });

        let events = observer.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], CrawlEvent::SeedStarted { max_depth: 2, .. }));
        assert!(matches!(events[1], CrawlEvent::RoundStarted { depth: 0, .. }));
    }
}
