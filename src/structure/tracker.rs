// src/structure/tracker.rs
// =============================================================================
// Link statistics that do not double count.
//
// A link to the same document often shows up several times on a page: in a
// summary paragraph, again in a table, again under a later heading. The
// tracker counts it once for the whole page, and once for every section it
// shows up in, no matter how many times it repeats inside that section.
// =============================================================================

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::resolver::ResolvedLink;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionStats {
    pub total_links: usize,
    pub pdf_links: usize,
    /// Links found inside table cells
    pub table_links: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStats {
    pub total_links: usize,
    pub pdf_links: usize,
    /// Keyed by section path joined with " > "
    pub sections: BTreeMap<String, SectionStats>,
}

/// Per-extraction occurrence state. Owned by one structuring pass and
/// passed around by `&mut`.
#[derive(Debug, Default)]
pub struct LinkTracker {
    counted_links: HashSet<String>,
    link_sections: HashMap<String, HashSet<String>>,
    stats: LinkStats,
}

impl LinkTracker {
    /// Starts counting for a section. Links recorded against sections that
    /// were never registered still count globally.
    pub fn register_section(&mut self, section: &str) {
        self.stats.sections.entry(section.to_string()).or_default();
    }

    pub fn record(&mut self, link: &ResolvedLink, section: &str, in_table: bool) {
        if self.counted_links.insert(link.url.clone()) {
            self.stats.total_links += 1;
            if link.is_pdf {
                self.stats.pdf_links += 1;
            }
        }

        let seen_in = self.link_sections.entry(link.url.clone()).or_default();
        if !seen_in.insert(section.to_string()) {
            return;
        }

        if let Some(counts) = self.stats.sections.get_mut(section) {
            counts.total_links += 1;
            if in_table {
                counts.table_links += 1;
            }
            if link.is_pdf {
                counts.pdf_links += 1;
            }
        }
    }

    pub fn into_stats(self) -> LinkStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{Detection, FileType};
    use url::Url;

    fn link(url: &str, file_type: FileType) -> ResolvedLink {
        let url = Url::parse(url).unwrap();
        ResolvedLink::new("doc", &url, Detection::found(file_type, &url))
    }

    #[test]
    fn test_repeat_in_same_section_counts_once() {
        let mut tracker = LinkTracker::default();
        tracker.register_section("A");
        let pdf = link("https://example.com/a.pdf", FileType::Pdf);

        tracker.record(&pdf, "A", false);
        tracker.record(&pdf, "A", false);

        let stats = tracker.into_stats();
        assert_eq!(stats.total_links, 1);
        assert_eq!(stats.pdf_links, 1);
        assert_eq!(stats.sections["A"].total_links, 1);
        assert_eq!(stats.sections["A"].pdf_links, 1);
    }

    #[test]
    fn test_same_link_in_two_sections() {
        let mut tracker = LinkTracker::default();
        tracker.register_section("A");
        tracker.register_section("A > B");
        let pdf = link("https://example.com/a.pdf", FileType::Pdf);

        tracker.record(&pdf, "A", false);
        tracker.record(&pdf, "A > B", true);
        tracker.record(&pdf, "A > B", true);

        let stats = tracker.into_stats();
        assert_eq!(stats.total_links, 1);
        assert_eq!(stats.pdf_links, 1);
        assert_eq!(stats.sections["A"].total_links, 1);
        assert_eq!(stats.sections["A"].table_links, 0);
        assert_eq!(stats.sections["A > B"].total_links, 1);
        assert_eq!(stats.sections["A > B"].table_links, 1);
    }

    #[test]
    fn test_non_pdf_and_unregistered_section() {
        let mut tracker = LinkTracker::default();
        let doc = link("https://example.com/a.docx", FileType::ZipOffice);

        tracker.record(&doc, "Nowhere", false);

        let stats = tracker.into_stats();
        assert_eq!(stats.total_links, 1);
        assert_eq!(stats.pdf_links, 0);
        assert!(stats.sections.is_empty());
    }

    #[test]
    fn test_stats_json_shape() {
        let mut tracker = LinkTracker::default();
        tracker.register_section("Page Header");
        let json = serde_json::to_value(tracker.into_stats()).unwrap();
        assert_eq!(json["total_links"], 0);
        assert_eq!(json["sections"]["Page Header"]["table_links"], 0);
    }
}
