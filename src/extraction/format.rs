//! Format resolution for uploaded documents.
//!
//! Dispatch is driven by the declared file name's extension through a fixed registry. The
//! declared content type is only a secondary signal: callers may check it with
//! [`DocumentFormat::accepts_content_type`] and log disagreements, but it never changes which
//! extractor runs.

use std::fmt;

/// Closed set of document formats the pipeline can extract text from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// Portable Document Format.
    Pdf,
    /// Office Open XML word-processing package.
    Docx,
    /// UTF-8 plain text.
    Txt,
}

/// Extension registry consulted by [`DocumentFormat::from_file_name`].
const REGISTRY: [(&str, DocumentFormat); 3] = [
    ("pdf", DocumentFormat::Pdf),
    ("docx", DocumentFormat::Docx),
    ("txt", DocumentFormat::Txt),
];

/// Content types that carry no format information.
const GENERIC_CONTENT_TYPES: [&str; 2] = ["application/octet-stream", "binary/octet-stream"];

impl DocumentFormat {
    /// Resolve the format from a declared file name.
    ///
    /// The extension is the lowercased substring after the final `.`. Names without a dot,
    /// with an empty extension, or with an unregistered extension resolve to `None`.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, extension) = file_name.rsplit_once('.')?;
        Self::from_extension(extension)
    }

    /// Look up a bare extension (without the dot) in the registry, ignoring case.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.trim().to_ascii_lowercase();
        REGISTRY
            .iter()
            .find(|(registered, _)| *registered == extension)
            .map(|(_, format)| *format)
    }

    /// Canonical lowercase extension for the format.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }

    /// MIME types that agree with this format.
    pub const fn content_types(self) -> &'static [&'static str] {
        match self {
            Self::Pdf => &["application/pdf", "application/x-pdf"],
            Self::Docx => &[
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                "application/zip",
            ],
            Self::Txt => &["text/plain"],
        }
    }

    /// Whether a declared content type is consistent with this format.
    ///
    /// Parameters such as `; charset=utf-8` are ignored. Generic binary types and blank
    /// values are always accepted because they say nothing about the format.
    pub fn accepts_content_type(self, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if essence.is_empty() || GENERIC_CONTENT_TYPES.contains(&essence.as_str()) {
            return true;
        }
        self.content_types().contains(&essence.as_str())
    }

    /// Every registered format, in registry order.
    pub fn all() -> impl Iterator<Item = Self> {
        REGISTRY.iter().map(|(_, format)| *format)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
