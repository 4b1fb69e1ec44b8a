// src/structure/outline.rs
// =============================================================================
// First pass of the structurer: walk the parse tree, no network.
//
// Produces one DraftSection per heading (plus the synthetic "Page Header" or
// "Main Content"), in document order. Links are kept as unresolved anchors;
// the second pass resolves them and builds the real tree.
//
// The body is walked in document order. Every text run and element goes to
// the heading opened last. An element that wraps a heading is walked into,
// so what comes before the nested heading stays with the outer section and
// what follows the wrapper stays with the nested one.
// =============================================================================

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::dom::{self, PageNode};
use crate::extract::text::clean_text;
use crate::resolver::absolute_href;

static LINKS_AND_TABLES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href], table").expect("link/table selector failed to parse - this is a bug"));
static ROWS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("row selector failed to parse - this is a bug"));
static HEADER_CELLS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("th selector failed to parse - this is a bug"));
static DATA_CELLS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("td selector failed to parse - this is a bug"));

/// Content before the first heading.
pub const PAGE_HEADER: &str = "Page Header";
/// The whole body, for pages without headings.
pub const MAIN_CONTENT: &str = "Main Content";

/// An anchor waiting to be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorRef {
    /// Raw anchor text, cleaned later
    pub text: String,
    pub url: Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftCell {
    pub header: String,
    pub text: String,
    pub links: Vec<AnchorRef>,
}

/// Rows of cells; each cell already knows its column header.
pub type DraftTable = Vec<Vec<DraftCell>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(String),
    Link(AnchorRef),
    Table(DraftTable),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSection {
    pub path: Vec<String>,
    pub level: u8,
    pub blocks: Vec<Block>,
}

impl DraftSection {
    fn synthetic(name: &str) -> Self {
        Self {
            path: vec![name.to_string()],
            level: 0,
            blocks: Vec::new(),
        }
    }

    /// Every anchor in the section, flat or in a table cell.
    pub fn anchors(&self) -> Vec<&AnchorRef> {
        let mut anchors = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(_) => {}
                Block::Link(anchor) => anchors.push(anchor),
                Block::Table(rows) => anchors.extend(rows.iter().flatten().flat_map(|cell| cell.links.iter())),
            }
        }
        anchors
    }
}

/// Open headings, innermost last.
#[derive(Debug, Default)]
struct PathStack {
    entries: Vec<(String, u8)>,
}

impl PathStack {
    /// Closes every open heading at `level` or deeper, opens this one, and
    /// returns the resulting path.
    fn enter(&mut self, text: String, level: u8) -> Vec<String> {
        while self.entries.last().is_some_and(|(_, top)| *top >= level) {
            self.entries.pop();
        }
        self.entries.push((text, level));
        self.entries.iter().map(|(text, _)| text.clone()).collect()
    }
}

/// Splits a page into draft sections by its h1–h6 headings.
pub fn outline(html: &str, base: &Url) -> Vec<DraftSection> {
    let document = Html::parse_document(html);
    let body = dom::body(&document);

    let first = if body.select(&dom::HEADINGS).next().is_some() {
        PAGE_HEADER
    } else {
        MAIN_CONTENT
    };

    let mut walker = Walker {
        base,
        stack: PathStack::default(),
        done: Vec::new(),
        current: DraftSection::synthetic(first),
    };
    walker.walk(body);
    walker.finish()
}

/// Document-order walk that hands every piece of content to the section
/// opened last.
struct Walker<'u> {
    base: &'u Url,
    stack: PathStack,
    done: Vec<DraftSection>,
    current: DraftSection,
}

impl Walker<'_> {
    fn walk(&mut self, container: ElementRef<'_>) {
        for child in dom::children(container) {
            match child {
                PageNode::Text(text) => {
                    let text = clean_text(text);
                    if !text.is_empty() {
                        self.current.blocks.push(Block::Paragraph(text));
                    }
                }
                PageNode::Element(el) if dom::is_heading(&el) => self.open(el),
                // Split the wrapper: what precedes the nested heading stays here
                PageNode::Element(el) if dom::contains_heading(el) => self.walk(el),
                PageNode::Element(el) => collect_blocks(el, self.base, &mut self.current.blocks),
            }
        }
    }

    fn open(&mut self, heading: ElementRef<'_>) {
        let level = dom::heading_level(dom::tag_name(&heading));
        let path = self.stack.enter(clean_text(&dom::text_content(heading)), level);
        let next = DraftSection {
            path,
            level,
            blocks: Vec::new(),
        };
        self.done.push(std::mem::replace(&mut self.current, next));
    }

    fn finish(mut self) -> Vec<DraftSection> {
        self.done.push(self.current);
        self.done
    }
}

/// What one element of a content span contributes.
fn collect_blocks(element: ElementRef<'_>, base: &Url, blocks: &mut Vec<Block>) {
    let text = clean_text(&dom::stripped_strings(element).join(" "));
    if !text.is_empty() {
        blocks.push(Block::Paragraph(text));
    }

    for el in dom::select_within(element, &LINKS_AND_TABLES) {
        match dom::tag_name(&el) {
            "table" => {
                let rows = draft_table(el, base);
                if !rows.is_empty() {
                    blocks.push(Block::Table(rows));
                }
            }
            // Anchors in tables are attributed to their cell instead
            _ if dom::inside_table(el, element) => {}
            _ => {
                if let Some(anchor) = anchor_ref(el, base) {
                    blocks.push(Block::Link(anchor));
                }
            }
        }
    }
}

/// Anchors need a navigable href and some visible text.
fn anchor_ref(anchor: ElementRef<'_>, base: &Url) -> Option<AnchorRef> {
    let text = dom::text_content(anchor);
    if text.trim().is_empty() {
        return None;
    }
    let url = absolute_href(base, dom::attr(&anchor, "href")?)?;
    Some(AnchorRef { text, url })
}

fn draft_table(table: ElementRef<'_>, base: &Url) -> DraftTable {
    let rows: Vec<ElementRef> = table
        .select(&ROWS)
        .filter(|row| owned_by(*row, table))
        .collect();

    let headers: Vec<String> = rows
        .first()
        .map(|row| {
            cells(*row, &HEADER_CELLS)
                .map(|th| clean_text(&dom::text_content(th)))
                .collect()
        })
        .unwrap_or_default();
    // Without <th> cells the first row is data like the rest
    let data_rows = if headers.is_empty() { &rows[..] } else { &rows[1..] };

    data_rows
        .iter()
        .map(|row| {
            cells(*row, &DATA_CELLS)
                .enumerate()
                .map(|(idx, td)| DraftCell {
                    header: headers
                        .get(idx)
                        .cloned()
                        .unwrap_or_else(|| format!("Column {}", idx + 1)),
                    text: clean_text(&dom::text_content(td)),
                    links: td
                        .select(&dom::ANCHORS)
                        .filter_map(|a| anchor_ref(a, base))
                        .collect(),
                })
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect()
}

/// Direct cells of a row matching `selector`.
fn cells<'a>(row: ElementRef<'a>, selector: &'static Selector) -> impl Iterator<Item = ElementRef<'a>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(move |el| selector.matches(el))
}

/// True when `table` is the nearest table around `row`.
fn owned_by(row: ElementRef<'_>, table: ElementRef<'_>) -> bool {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| dom::tag_name(el) == "table")
        .is_some_and(|el| el.id() == table.id())
}
