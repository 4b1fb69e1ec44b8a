// src/extract/content.rs
// =============================================================================
// Plain-text rendering of a page, for feeding to people or other tools.
//
// Scripts and styles are always dropped. Site chrome (header, footer, nav
// and their common class/id spellings) is dropped unless asked to keep it.
// =============================================================================

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::text::clean_text_preserve_paragraphs;
use crate::dom::{self, PageNode};

static NEVER_TEXT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script, style, noscript").expect("never-text selector failed to parse - this is a bug")
});

static CHROME: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("header, footer, nav, .header, .footer, .site-header, .site-footer, #header, #footer")
        .expect("chrome selector failed to parse - this is a bug")
});

/// Renders the page as text: one line per text run, blank lines dropped.
pub fn page_text(html: &str, keep_chrome: bool) -> String {
    let document = Html::parse_document(html);
    let mut runs = Vec::new();
    collect_runs(document.root_element(), keep_chrome, &mut runs);

    let lines: Vec<&str> = runs
        .iter()
        .flat_map(|run| run.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    clean_text_preserve_paragraphs(&lines.join("\n"))
}

fn collect_runs<'a>(element: ElementRef<'a>, keep_chrome: bool, runs: &mut Vec<&'a str>) {
    if is_skipped(&element, keep_chrome) {
        return;
    }
    for child in dom::children(element) {
        match child {
            PageNode::Text(text) => runs.push(text),
            PageNode::Element(el) => collect_runs(el, keep_chrome, runs),
        }
    }
}

fn is_skipped(element: &ElementRef<'_>, keep_chrome: bool) -> bool {
    NEVER_TEXT.matches(element) || (!keep_chrome && CHROME.matches(element))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><head><title>2018 Solicitation</title><style>p { color: red }</style></head>
        <body>
          <header>Site banner</header>
          <nav><a href="/">Home</a></nav>
          <div class="site-header">Logo</div>
          <main>
            <h1>Offshore   Wind</h1>
            <p>Proposals are due
               March 1.</p>
            <script>track();</script>
          </main>
          <div id="footer">Contact us</div>
        </body></html>
    "#;

    #[test]
    fn test_page_text_drops_chrome() {
        let text = page_text(PAGE, false);
        assert_eq!(
            text,
            "2018 Solicitation\nOffshore Wind\nProposals are due\nMarch 1."
        );
    }

    #[test]
    fn test_page_text_chrome_by_id_and_class() {
        let html = r#"<body>
            <div id="header">Top</div>
            <section class="footer wide">Bottom</section>
            <p class="headline">Kept</p>
        </body>"#;
        assert_eq!(page_text(html, false), "Kept");
    }

    #[test]
    fn test_page_text_keeps_chrome_on_request() {
        let text = page_text(PAGE, true);
        assert!(text.contains("Site banner"));
        assert!(text.contains("Home"));
        assert!(text.contains("Contact us"));
        assert!(!text.contains("track()"));
        assert!(!text.contains("color: red"));
    }
}
