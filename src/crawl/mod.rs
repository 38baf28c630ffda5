// src/crawl/mod.rs
// =============================================================================
// Website crawling.
//
// Features:
// - Breadth-first traversal, one full depth level ("round") at a time
// - Same-origin restriction (never leaves the seed's scheme + host + port)
// - Path-suffix blacklist (".pdf", ".jpg", ...)
// - Depth limit per seed
// - Per-seed statistics: page records and a status-code histogram
//
// Submodules:
// - filter: which discovered links are allowed into the next round
// - state: the per-seed record (visited set, frontier, stats)
// - events: structured events describing the crawl as it runs
// - orchestrator: the Crawler that drives rounds and seeds
// =============================================================================

mod events;
mod filter;
mod orchestrator;
mod state;

pub use events::TracingObserver;
pub use orchestrator::Crawler;
pub use state::{CrawlPhase, PageRecord, SeedCrawl};
