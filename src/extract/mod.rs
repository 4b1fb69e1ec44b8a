// src/extract/mod.rs
// =============================================================================
// Flat extraction from a single page.
//
// Submodules:
// - links: resolved document links, whole page or tables only
// - content: plain-text rendering of the page
// - text: whitespace cleanup and filename helpers shared with the structurer
// =============================================================================

mod content;
mod links;
pub mod text;

pub use content::page_text;
pub use links::{extract_links, LinkScope};
