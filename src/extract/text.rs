// src/extract/text.rs
// =============================================================================
// Small text helpers: whitespace normalization and filesystem-safe names.
//
// Link text scraped from real pages is messy: non-breaking spaces, newlines
// in the middle of a title, trailing periods. These helpers turn it into
// something that can be compared, printed, or used as a filename.
// =============================================================================

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

const MAX_NAME_LEN: usize = 100;
const PLACEHOLDER_NAME: &str = "unnamed_file";

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static INLINE_SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\r\x0B\x0C]+").unwrap());
static PARAGRAPH_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").unwrap());
static INVALID_PATH_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|]"#).unwrap());
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s.,;()]").unwrap());
static UNDERSCORES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").unwrap());

/// Replaces non-breaking spaces, collapses whitespace runs and trims.
pub fn clean_text(text: &str) -> String {
    let text = text.replace('\u{a0}', " ").replace("&nbsp;", " ");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Like [`clean_text`], but keeps line breaks inside paragraphs and a blank
/// line between paragraphs.
pub fn clean_text_preserve_paragraphs(text: &str) -> String {
    let text = text.replace('\u{a0}', " ").replace("&nbsp;", " ");

    PARAGRAPH_BREAK_RE
        .split(&text)
        .map(|para| INLINE_SPACE_RE.replace_all(para, " ").trim().to_string())
        .filter(|para| !para.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Turns arbitrary text into a filesystem-safe slug.
///
/// Path-hostile characters, whitespace and punctuation all become single
/// underscores. Text that sanitizes to nothing becomes `unnamed_file`.
pub fn sanitize_filename(text: &str) -> String {
    let text = clean_text(text);
    let text = INVALID_PATH_CHARS_RE.replace_all(&text, "_");
    let text = SEPARATOR_RE.replace_all(&text, "_");
    let text = UNDERSCORES_RE.replace_all(&text, "_");

    let name: String = text.trim_matches('_').chars().take(MAX_NAME_LEN).collect();

    if name.is_empty() {
        PLACEHOLDER_NAME.to_string()
    } else {
        name
    }
}

/// Derives a filename from the last path segment of a URL.
///
/// The segment is percent-decoded; query string and fragment never take
/// part. A short alphanumeric extension is kept after a single dot, the rest
/// is slugged with [`sanitize_filename`]. URLs ending in `/` have no
/// filename.
pub fn filename_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let decoded = urlencoding::decode(parsed.path())
        .map(|path| path.into_owned())
        .unwrap_or_else(|_| parsed.path().to_string());

    let last = decoded.rsplit('/').next().unwrap_or("");
    if last.is_empty() {
        return None;
    }

    match last.rsplit_once('.') {
        Some((stem, ext)) if is_extension(ext) && !stem.trim().is_empty() => Some(format!(
            "{}.{}",
            sanitize_filename(stem),
            ext.to_ascii_lowercase()
        )),
        _ => Some(sanitize_filename(last)),
    }
}

fn is_extension(ext: &str) -> bool {
    (1..=5).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric())
}
