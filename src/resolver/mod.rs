// src/resolver/mod.rs
// =============================================================================
// Link resolution: absolute URL in, true file type and serving URL out.
//
// Submodules:
// - signature: magic-number table and FileType
// - detect: the two-stage HTTP detection (direct, then client redirect)
// - link: Detection / ResolvedLink records and href preconditions
// =============================================================================

mod detect;
mod link;
mod signature;

pub use detect::LinkResolver;
pub use link::{Detection, ResolvedLink};
pub use signature::FileType;

use url::Url;

/// Joins an anchor's href against the page URL.
///
/// Returns None for hrefs that are never resolved: empty, `javascript:`
/// pseudo-links and the bare `#` fragment. Unjoinable hrefs are dropped too.
pub fn absolute_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href == "#" || href.to_ascii_lowercase().starts_with("javascript:") {
        return None;
    }
    base.join(href).ok()
}
