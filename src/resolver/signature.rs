// src/resolver/signature.rs
// =============================================================================
// File type detection from leading bytes ("magic numbers").
//
// Servers in front of solicitation documents routinely lie: PDFs come back
// as text/html, download endpoints have no extension at all. The first few
// bytes of the body are the only thing we trust.
// =============================================================================

use serde::{Deserialize, Serialize};

/// What a linked resource turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Pdf,
    /// ZIP container: docx, xlsx, pptx, plain zip
    ZipOffice,
    /// OLE compound binary: doc, xls, ppt
    LegacyOffice,
    Rtf,
    Html,
    Xml,
    Gif,
    Png,
    Jpeg,
    Unknown,
}

// Checked in order, first match wins. The HTML entries are case-sensitive.
const SIGNATURES: &[(&[u8], FileType)] = &[
    (b"%PDF-", FileType::Pdf),
    (b"\x50\x4B\x03\x04", FileType::ZipOffice),
    (b"\xD0\xCF\x11\xE0", FileType::LegacyOffice),
    (b"\x7B\x5C\x72\x74", FileType::Rtf),
    (b"\x3C\x21\x44\x4F", FileType::Html),
    (b"\x3C\x68\x74\x6D", FileType::Html),
    (b"\x3C\x3F\x78\x6D", FileType::Xml),
    (b"\x47\x49\x46\x38", FileType::Gif),
    (b"\x89\x50\x4E\x47", FileType::Png),
    (b"\xFF\xD8\xFF", FileType::Jpeg),
];

impl FileType {
    /// Classifies a body by its leading bytes.
    pub fn sniff(head: &[u8]) -> Self {
        SIGNATURES
            .iter()
            .find(|(magic, _)| head.starts_with(magic))
            .map(|(_, file_type)| *file_type)
            .unwrap_or(FileType::Unknown)
    }

    pub fn is_known(self) -> bool {
        self != FileType::Unknown
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::ZipOffice => "zip_office",
            FileType::LegacyOffice => "legacy_office",
            FileType::Rtf => "rtf",
            FileType::Html => "html",
            FileType::Xml => "xml",
            FileType::Gif => "gif",
            FileType::Png => "png",
            FileType::Jpeg => "jpeg",
            FileType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
