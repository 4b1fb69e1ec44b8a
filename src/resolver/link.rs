// src/resolver/link.rs
// =============================================================================
// The records produced by link resolution.
//
// Detection is what the resolver learned about one absolute URL. A
// ResolvedLink is a Detection dressed up with the anchor it came from: the
// visible text, a filename-safe version of it, and a filename guessed from
// the URL that actually served the bytes.
// =============================================================================

use serde::{Deserialize, Serialize};
use url::Url;

use super::signature::FileType;
use crate::extract::text::{clean_text, filename_from_url, sanitize_filename};

/// Outcome of classifying one absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub file_type: FileType,
    /// The URL whose bytes were inspected, or the best known URL on failure
    pub file_url: String,
    pub error: Option<String>,
}

impl Detection {
    pub fn found(file_type: FileType, url: &Url) -> Self {
        Self {
            file_type,
            file_url: url.to_string(),
            error: None,
        }
    }

    pub fn failed(url: &Url, error: impl std::fmt::Display) -> Self {
        Self {
            file_type: FileType::Unknown,
            file_url: url.to_string(),
            error: Some(error.to_string()),
        }
    }
}

/// One hyperlink after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLink {
    /// Visible anchor text, whitespace-normalized
    pub text: String,
    /// The href joined against the page URL
    pub url: String,
    pub is_pdf: bool,
    pub file_type: FileType,
    /// Where the detected content actually lives
    pub file_url: String,
    pub safe_text: String,
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub in_table: bool,
}

impl ResolvedLink {
    pub fn new(raw_text: &str, url: &Url, detection: Detection) -> Self {
        let filename = filename_from_url(&detection.file_url);
        Self {
            text: clean_text(raw_text),
            url: url.to_string(),
            is_pdf: detection.file_type == FileType::Pdf,
            file_type: detection.file_type,
            file_url: detection.file_url,
            safe_text: sanitize_filename(raw_text),
            filename,
            error: detection.error,
            in_table: false,
        }
    }
}
