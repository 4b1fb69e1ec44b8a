// src/error.rs
// =============================================================================
// Error types shared by the resolver, the extractors and the page fetcher.
//
// There are two families:
// - ResolveError: something went wrong while classifying ONE link. These never
//   escape the resolver; they are folded into an `unknown` file type plus an
//   error message on the link record.
// - ScrapeError: the page itself could not be processed. These abort the
//   whole extraction call and are reported to the caller.
// =============================================================================

use reqwest::StatusCode;
use thiserror::Error;

/// Failure while resolving and classifying a single link.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Transport failure: DNS, connection refused, timeout, broken body
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered, but not with a 2xx status
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    /// The first bytes matched no known file signature
    #[error("no known file signature at {url}")]
    ClassificationUnknown { url: String },

    /// The fallback page carried no client-side redirect marker
    #[error("no client-side redirect found on {url}")]
    RedirectNotFound { url: String },

    #[error("cannot build URL from '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl ResolveError {
    pub fn network(url: &url::Url, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.to_string(),
            source,
        }
    }

    pub fn status(url: &url::Url, status: StatusCode) -> Self {
        Self::Status {
            url: url.to_string(),
            status,
        }
    }
}

/// Fatal failure for one extraction call.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to fetch page {url}: {source}")]
    PageFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to fetch page {url}: HTTP {status}")]
    PageStatus { url: String, status: StatusCode },
}

impl ScrapeError {
    pub fn invalid_url(url: &str, source: url::ParseError) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            source,
        }
    }
}

/// Parses the page URL every extraction is anchored to.
pub fn parse_base_url(base_url: &str) -> Result<url::Url, ScrapeError> {
    url::Url::parse(base_url).map_err(|source| ScrapeError::invalid_url(base_url, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_status_message_names_url_and_status() {
        let err = ScrapeError::PageStatus {
            url: "https://example.com/page".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        let message = err.to_string();
        assert!(message.contains("https://example.com/page"));
        assert!(message.contains("404"));
    }

    #[test]
    fn test_parse_base_url_rejects_relative() {
        let err = parse_base_url("/relative/page").unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidUrl { .. }));
    }
}
