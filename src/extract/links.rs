// src/extract/links.rs
// =============================================================================
// Flat link extraction: every document link on a page, as one list.
//
// Steps:
// 1. Parse the HTML and select <a href> elements (whole page or tables only)
// 2. Join each href against the page URL, skip pseudo-links
// 3. Keep only the first anchor for each absolute URL
// 4. Resolve every remaining URL (optionally a few at a time)
// 5. Drop what could not be classified: callers only want documents
//
// The parse tree is dropped after step 3, so nothing borrowed from it is
// held across an await.
// =============================================================================

use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use scraper::Html;
use tracing::{debug, info};
use url::Url;

use crate::dom;
use crate::error::{parse_base_url, ScrapeError};
use crate::resolver::{absolute_href, LinkResolver, ResolvedLink};

/// Which anchors of the page take part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkScope {
    WholePage,
    /// Only anchors inside a <table>; results are flagged `in_table`
    TablesOnly,
}

/// An anchor that survived filtering and deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    text: String,
    url: Url,
}

// Extracts, resolves and filters the document links of a page
//
// Parameters:
//   html: the page HTML
//   base_url: the URL the page was fetched from (relative hrefs join onto it)
//   resolver: shared resolver, one detection per unique link
//   scope: whole page, or only anchors inside tables
//   concurrency: how many links are resolved at once (1 = one after another)
//
// Returns: the links with a recognized file type, in page order.
// Links that resolve to `unknown` are left out; a failing link never stops
// the others. Only an invalid base_url is an error.
pub async fn extract_links(
    html: &str,
    base_url: &str,
    resolver: &LinkResolver,
    scope: LinkScope,
    concurrency: usize,
) -> Result<Vec<ResolvedLink>, ScrapeError> {
    let base = parse_base_url(base_url)?;

    // Parse, filter and deduplicate before the first await
    let candidates = collect_candidates(html, &base, scope);
    info!("Resolving {} unique link(s)", candidates.len());

    // buffered() keeps input order even when several requests are in flight
    let resolved: Vec<ResolvedLink> = stream::iter(candidates)
        .map(|candidate| async move {
            let detection = resolver.detect(&candidate.url).await;
            ResolvedLink::new(&candidate.text, &candidate.url, detection)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    // Keep only what we could classify, flagged with where it was found
    let in_table = scope == LinkScope::TablesOnly;
    let links = resolved
        .into_iter()
        .filter(|link| {
            if !link.file_type.is_known() {
                debug!(url = %link.url, "dropping unclassified link");
            }
            link.file_type.is_known()
        })
        .map(|mut link| {
            link.in_table = in_table;
            link
        })
        .collect();

    Ok(links)
}

fn collect_candidates(html: &str, base: &Url, scope: LinkScope) -> Vec<Candidate> {
    let document = Html::parse_document(html);

    // "table a[href]" matches anchors at any depth below a table
    let selector = match scope {
        LinkScope::WholePage => &*dom::ANCHORS,
        LinkScope::TablesOnly => &*dom::TABLE_ANCHORS,
    };

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for anchor in document.select(selector) {
        let Some(href) = dom::attr(&anchor, "href") else {
            continue;
        };
        let Some(url) = absolute_href(base, href) else {
            continue;
        };
        // First anchor wins for each absolute URL
        if !seen.insert(url.to_string()) {
            continue;
        }
        candidates.push(Candidate {
            text: dom::text_content(anchor),
            url,
        });
    }

    candidates
}
