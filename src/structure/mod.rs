// src/structure/mod.rs
// =============================================================================
// Hierarchical structuring of a page by its headings.
//
// Two passes:
// 1. outline: walk the parse tree into draft sections (no network)
// 2. resolve every distinct link once, then build the section tree and the
//    link statistics in document order
//
// Submodules:
// - outline: heading walk, content spans, table parsing
// - section: the resulting tree and its JSON form
// - tracker: occurrence counting without double counts
// =============================================================================

mod outline;
mod section;
mod tracker;

pub use outline::{MAIN_CONTENT, PAGE_HEADER};
pub use section::{path_key, CellValue, Section, SectionTree, Table, TableRow};
pub use tracker::{LinkStats, LinkTracker, SectionStats};

use std::collections::{HashMap, HashSet};

use futures::stream::{self, StreamExt};
use tracing::info;
use url::Url;

use crate::error::{parse_base_url, ScrapeError};
use crate::resolver::{Detection, LinkResolver, ResolvedLink};
use outline::{AnchorRef, Block, DraftSection, DraftTable};

/// Result of structuring one page.
#[derive(Debug)]
pub struct StructuredPage {
    pub sections: SectionTree,
    pub stats: LinkStats,
}

// Builds the section tree of a page and its link statistics
//
// Parameters:
//   html: the page HTML
//   base_url: the URL the page was fetched from
//   resolver: shared resolver; every distinct link is resolved once
//   concurrency: how many links are resolved at once (1 = one after another)
//
// Returns: StructuredPage with the section tree and the link statistics.
// Unresolvable links stay in the tree with their error; only an invalid
// base_url is an error.
pub async fn structure_page(
    html: &str,
    base_url: &str,
    resolver: &LinkResolver,
    concurrency: usize,
) -> Result<StructuredPage, ScrapeError> {
    let base = parse_base_url(base_url)?;

    // Pass 1: heading walk, no network; the parse tree is gone afterwards
    let drafts = outline::outline(html, &base);

    // Pass 2: resolve each distinct link once
    let urls = distinct_urls(&drafts);
    info!(
        "Found {} section(s), resolving {} distinct link(s)",
        drafts.len(),
        urls.len()
    );

    let detections: HashMap<String, Detection> = stream::iter(urls)
        .map(|url| async move {
            let detection = resolver.detect(&url).await;
            (url.to_string(), detection)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    // Build the tree and count occurrences in document order
    Ok(assemble(drafts, &detections))
}

/// Every link URL in the drafts, first occurrence first.
fn distinct_urls(drafts: &[DraftSection]) -> Vec<Url> {
    let mut seen = HashSet::new();
    drafts
        .iter()
        .flat_map(|draft| draft.anchors())
        .filter(|anchor| seen.insert(anchor.url.as_str()))
        .map(|anchor| anchor.url.clone())
        .collect()
}

fn assemble(drafts: Vec<DraftSection>, detections: &HashMap<String, Detection>) -> StructuredPage {
    let mut tree = SectionTree::default();
    let mut tracker = LinkTracker::default();

    for draft in drafts {
        let Some(idx) = tree.get_or_create(&draft.path, draft.level, |path| {
            tracker.register_section(&path_key(path))
        }) else {
            continue;
        };
        let key = path_key(&draft.path);

        for block in draft.blocks {
            match block {
                Block::Paragraph(text) => tree.section_mut(idx).paragraphs.push(text),
                Block::Link(anchor) => {
                    let link = to_link(&anchor, detections);
                    tracker.record(&link, &key, false);
                    tree.section_mut(idx).links.push(link);
                }
                Block::Table(rows) => {
                    let table = build_table(rows, detections, &key, &mut tracker);
                    if !table.is_empty() {
                        tree.section_mut(idx).tables.push(table);
                    }
                }
            }
        }
    }

    StructuredPage {
        sections: tree,
        stats: tracker.into_stats(),
    }
}

fn build_table(
    rows: DraftTable,
    detections: &HashMap<String, Detection>,
    section: &str,
    tracker: &mut LinkTracker,
) -> Table {
    rows.into_iter()
        .map(|cells| {
            let mut row = TableRow::default();
            for cell in cells {
                let links: Vec<ResolvedLink> = cell
                    .links
                    .iter()
                    .map(|anchor| to_link(anchor, detections))
                    .collect();
                for link in &links {
                    tracker.record(link, section, true);
                }

                row.insert(cell.header.clone(), CellValue::Text(cell.text));
                if !links.is_empty() {
                    row.insert(format!("{}_links", cell.header), CellValue::Links(links));
                }
            }
            row
        })
        .filter(|row| !row.is_empty())
        .collect()
}

fn to_link(anchor: &AnchorRef, detections: &HashMap<String, Detection>) -> ResolvedLink {
    let detection = detections
        .get(anchor.url.as_str())
        .cloned()
        .unwrap_or_else(|| Detection::failed(&anchor.url, "link was not resolved"));
    ResolvedLink::new(&anchor.text, &anchor.url, detection)
}
