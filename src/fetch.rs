// src/fetch.rs
// =============================================================================
// Fetches the one page a run is about.
//
// Unlike link resolution, failing here is fatal: without the page there is
// nothing to extract, so the error goes back to the caller with the URL and
// the HTTP status in the message.
// =============================================================================

use reqwest::Client;
use tracing::info;

use crate::error::{parse_base_url, ScrapeError};

// Fetches a web page and returns its HTML content
//
// Parameters:
//   client: the shared HTTP client (timeout and headers already set)
//   url: the page URL as given on the command line
//
// Returns: Ok(html) on a 2xx response, Err(ScrapeError) otherwise
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, ScrapeError> {
    // Reject garbage before touching the network
    let parsed = parse_base_url(url)?;
    info!("Fetching page {}", parsed);

    // Send the GET request; HTTP redirects are followed by reqwest
    let response = client
        .get(parsed)
        .send()
        .await
        .map_err(|source| ScrapeError::PageFetch {
            url: url.to_string(),
            source,
        })?;

    // Any non-2xx status means we did not get the page
    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::PageStatus {
            url: url.to_string(),
            status,
        });
    }

    response.text().await.map_err(|source| ScrapeError::PageFetch {
        url: url.to_string(),
        source,
    })
}
