// src/config.rs
// =============================================================================
// Runtime configuration for one scrape.
//
// The CLI fills a ScrapeConfig from its flags; everything else only sees this
// struct. It also owns the construction of the shared reqwest Client, so the
// timeout and the browser-like headers are set in exactly one place.
// =============================================================================

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::Client;
use url::Url;

use crate::error::ScrapeError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Only this many leading bytes of a linked document are inspected.
pub const SNIFF_LEN: usize = 512;

/// Host that serves the "please wait" redirect pages in front of documents.
pub const DEFAULT_FALLBACK_HOST: &str = "https://portal.nyserda.ny.gov";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36";

const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// Number of leading bytes used for file signature detection
    pub sniff_len: usize,
    /// Base the second-stage (redirect shim) request is joined against
    pub fallback_host: Url,
    pub user_agent: String,
    pub referer: String,
    /// How many links may be resolved at the same time (1 = sequential)
    pub concurrency: usize,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            sniff_len: SNIFF_LEN,
            // Constant and known to be valid
            fallback_host: Url::parse(DEFAULT_FALLBACK_HOST).expect("default fallback host is a valid URL"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: DEFAULT_FALLBACK_HOST.to_string(),
            concurrency: 1,
        }
    }
}

impl ScrapeConfig {
    /// Replaces the fallback host, validating it first.
    pub fn with_fallback_host(mut self, host: &str) -> Result<Self, ScrapeError> {
        self.fallback_host = Url::parse(host).map_err(|source| ScrapeError::invalid_url(host, source))?;
        Ok(self)
    }

    /// Builds the HTTP client every request of the scrape goes through.
    ///
    /// HTTP redirects are followed (reqwest's default policy); client-side
    /// redirects are the resolver's business.
    pub fn build_client(&self) -> Result<Client, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE));
        // A referer with bytes that are not legal in a header is dropped, not fatal
        if let Ok(referer) = HeaderValue::from_str(&self.referer) {
            headers.insert(REFERER, referer);
        }
        if let Ok(agent) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, agent);
        }

        Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .build()
            .map_err(ScrapeError::Client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScrapeConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert_eq!(config.sniff_len, 512);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.fallback_host.as_str(), "https://portal.nyserda.ny.gov/");
    }

    #[test]
    fn test_invalid_fallback_host() {
        let result = ScrapeConfig::default().with_fallback_host("not a url");
        assert!(result.is_err());
    }

    #[test]
    fn test_build_client() {
        assert!(ScrapeConfig::default().build_client().is_ok());
    }
}
