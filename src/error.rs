// src/error.rs
// =============================================================================
// Typed errors for the crawler.
//
// Three kinds of failure, each handled at a different level:
// - ConfigError: bad settings or seeds. Fatal, nothing is crawled.
// - FetchError: one URL could not be fetched. Recorded, the round goes on.
// - ParseError: a fetched page could not be parsed. The page is still
//   recorded, it just contributes no links.
//
// The application layer (main, storage) uses anyhow on top of these.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max depth must be at least 1 (got {0})")]
    InvalidMaxDepth(usize),

    #[error("batch size must be at least 1 (got {0})")]
    InvalidBatchSize(usize),

    #[error("no seed URLs were given")]
    NoSeeds,

    #[error("invalid seed URL '{seed}': {reason}")]
    InvalidSeed { seed: String, reason: String },

    #[error("seed URL '{0}' must use http or https")]
    UnsupportedScheme(String),
}

/// Why a single URL could not be fetched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("too many redirects")]
    TooManyRedirects,

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl FetchError {
    // Sorts a reqwest error into one of our buckets
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_redirect() {
            FetchError::TooManyRedirects
        } else if error.is_connect() {
            FetchError::Connect(error.to_string())
        } else if error.is_body() || error.is_decode() {
            FetchError::Body(error.to_string())
        } else {
            FetchError::Request(error.to_string())
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid CSS selector '{0}'")]
    Selector(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::InvalidMaxDepth(0).to_string(),
            "max depth must be at least 1 (got 0)"
        );
        let err = ConfigError::InvalidSeed {
            seed: "nope".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid seed URL 'nope': relative URL without a base"
        );
    }

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(FetchError::Timeout.to_string(), "request timed out");
        assert_eq!(
            FetchError::Connect("refused".to_string()).to_string(),
            "connection failed: refused"
        );
    }
}
