// src/dom.rs
// =============================================================================
// A thin view over scraper's parse tree.
//
// Element lookups go through CSS selectors (scraper::Selector), parsed once
// into statics. Where the extractors need the page's structure in order
// (text runs interleaved with elements), children are exposed as a PageNode
// that is either an Element or a Text. Everything else (comments,
// processing instructions) is skipped.
// =============================================================================

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

// Selectors are constants and known to be valid
fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector failed to parse - this is a bug")
}

/// Anchors that point somewhere.
pub static ANCHORS: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

/// Anchors with a table somewhere above them.
pub static TABLE_ANCHORS: LazyLock<Selector> = LazyLock::new(|| selector("table a[href]"));

pub static HEADINGS: LazyLock<Selector> = LazyLock::new(|| selector("h1, h2, h3, h4, h5, h6"));

static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));

/// Elements whose text never counts as page content.
static NON_CONTENT: LazyLock<Selector> = LazyLock::new(|| selector("script, style"));

/// One child of an element, as seen by the extractors.
#[derive(Debug, Clone, Copy)]
pub enum PageNode<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
}

/// Direct children of `element`, in document order.
pub fn children<'a>(element: ElementRef<'a>) -> impl Iterator<Item = PageNode<'a>> {
    element.children().filter_map(|child| {
        if let Some(el) = ElementRef::wrap(child) {
            Some(PageNode::Element(el))
        } else {
            child.value().as_text().map(|text| PageNode::Text(&**text))
        }
    })
}

/// Lower-case tag name of an element.
pub fn tag_name<'a>(element: &ElementRef<'a>) -> &'a str {
    element.value().name()
}

pub fn attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name)
}

/// Like `element.select(selector)`, but `element` itself is a candidate too.
pub fn select_within<'a, 'b>(
    element: ElementRef<'a>,
    selector: &'b Selector,
) -> impl Iterator<Item = ElementRef<'a>> + 'b
where
    'a: 'b,
{
    std::iter::once(element)
        .filter(move |el| selector.matches(el))
        .chain(element.select(selector))
}

/// The `<body>` of a parsed page, or the root element for fragments
/// that somehow lack one.
pub fn body(document: &Html) -> ElementRef<'_> {
    document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element())
}

/// Heading level from a tag name: `h1` → 1 ... `h6` → 6.
///
/// Anything that is not `h` followed by a digit yields 0, which sorts below
/// every real heading.
pub fn heading_level(name: &str) -> u8 {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some('h'), Some(digit)) => digit.to_digit(10).map(|d| d as u8).unwrap_or(0),
        _ => 0,
    }
}

pub fn is_heading(element: &ElementRef<'_>) -> bool {
    HEADINGS.matches(element)
}

/// True when any element strictly below `element` is a heading.
pub fn contains_heading(element: ElementRef<'_>) -> bool {
    element.select(&HEADINGS).next().is_some()
}

/// True when `element` sits inside a `<table>`, looking no further up than
/// `scope` (inclusive).
pub fn inside_table(element: ElementRef<'_>, scope: ElementRef<'_>) -> bool {
    if element.id() == scope.id() {
        return false;
    }
    for ancestor in element.ancestors().filter_map(ElementRef::wrap) {
        if tag_name(&ancestor) == "table" {
            return true;
        }
        if ancestor.id() == scope.id() {
            break;
        }
    }
    false
}

/// Every text run below `element`, trimmed, empties dropped.
///
/// Script and style bodies are not content and are skipped.
pub fn stripped_strings(element: ElementRef<'_>) -> Vec<String> {
    let mut out = Vec::new();
    collect_strings(element, &mut out);
    out
}

fn collect_strings(element: ElementRef<'_>, out: &mut Vec<String>) {
    if NON_CONTENT.matches(&element) {
        return;
    }
    for child in children(element) {
        match child {
            PageNode::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    out.push(text.to_string());
                }
            }
            PageNode::Element(el) => collect_strings(el, out),
        }
    }
}

/// All text below `element` concatenated, like a browser's textContent.
pub fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first<'a>(doc: &'a Html, css: &str) -> ElementRef<'a> {
        doc.select(&selector(css)).next().unwrap()
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level("h1"), 1);
        assert_eq!(heading_level("h6"), 6);
        assert_eq!(heading_level("hx"), 0);
        assert_eq!(heading_level("header"), 0);
        assert_eq!(heading_level("p"), 0);
        assert_eq!(heading_level(""), 0);
    }

    #[test]
    fn test_stripped_strings_skips_scripts() {
        let doc = Html::parse_document(
            "<body><div> Hello <b>world</b>  <script>var x = 1;</script>\n</div></body>",
        );
        let div = first(&doc, "div");
        assert_eq!(stripped_strings(div), vec!["Hello", "world"]);
    }

    #[test]
    fn test_children_distinguishes_text_and_elements() {
        let doc = Html::parse_document("<body><p>a<!-- note --><em>b</em></p></body>");
        let p = first(&doc, "p");
        let kinds: Vec<&str> = children(p)
            .map(|node| match node {
                PageNode::Element(_) => "element",
                PageNode::Text(_) => "text",
            })
            .collect();
        assert_eq!(kinds, vec!["text", "element"]);
    }

    #[test]
    fn test_inside_table() {
        let doc = Html::parse_document(
            "<body><div><table><tr><td><a href='x'>x</a></td></tr></table><a href='y'>y</a></div></body>",
        );
        let div = first(&doc, "div");
        let anchors: Vec<_> = div.select(&ANCHORS).collect();
        assert!(inside_table(anchors[0], div));
        assert!(!inside_table(anchors[1], div));
    }

    #[test]
    fn test_contains_heading() {
        let doc = Html::parse_document("<body><div><section><h3>T</h3></section></div><p>x</p></body>");
        assert!(contains_heading(first(&doc, "div")));
        assert!(!contains_heading(first(&doc, "p")));
        assert!(!contains_heading(first(&doc, "h3")));
    }

    #[test]
    fn test_select_within_includes_element_itself() {
        let doc = Html::parse_document(
            "<body><a href='/a.pdf'>A</a><p><a href='/b.pdf'>B</a> <a href='/c.pdf'>C</a></p></body>",
        );
        assert_eq!(select_within(first(&doc, "a"), &ANCHORS).count(), 1);
        assert_eq!(select_within(first(&doc, "p"), &ANCHORS).count(), 2);
        assert_eq!(first(&doc, "p").select(&ANCHORS).count(), 2);
    }

    #[test]
    fn test_body_of_fragment() {
        let doc = Html::parse_document("<p>loose</p>");
        assert_eq!(tag_name(&body(&doc)), "body");
    }
}
