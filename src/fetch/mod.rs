// src/fetch/mod.rs
// =============================================================================
// Everything that touches the network.
//
// Submodules:
// - http: the Fetcher trait, FetchResult and the reqwest transport
// - html: title and link extraction from fetched pages
// - dispatch: concurrent, batched fetching of a whole frontier
// =============================================================================

mod dispatch;
mod html;
mod http;

pub use dispatch::BatchDispatcher;
pub use http::{FetchResult, Fetcher, HttpFetcher};
