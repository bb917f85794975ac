//! Bytes-to-text extractors for the supported document formats.
//!
//! Every extractor is a pure function over an immutable buffer: the same bytes always yield the
//! same text, nothing is streamed, and an empty result is returned as-is so the validation
//! stage can reject it.

mod docx;
mod format;
mod pdf;
mod txt;

pub use format::DocumentFormat;
use thiserror::Error;

/// Errors raised while turning document bytes into plain text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Plain-text upload was not valid UTF-8.
    #[error("text file is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    /// DOCX bytes were not a readable word-processing package.
    #[error("invalid DOCX document: {0}")]
    InvalidDocx(String),
    /// PDF bytes could not be parsed.
    #[error("invalid PDF document: {0}")]
    MalformedPdf(String),
    /// PDF is encrypted and cannot be read without a password.
    #[error("PDF document is encrypted")]
    EncryptedPdf,
    /// Uploaded bytes could not be read back from temporary storage.
    #[error("failed to read uploaded file: {0}")]
    Io(#[from] std::io::Error),
    /// Extraction task terminated before producing a result.
    #[error("extraction task failed: {0}")]
    Interrupted(String),
}

impl DocumentFormat {
    /// Run the extractor registered for this format.
    pub fn extract(self, bytes: &[u8]) -> Result<String, ExtractionError> {
        match self {
            Self::Pdf => pdf::extract_text(bytes),
            Self::Docx => docx::extract_text(bytes),
            Self::Txt => txt::extract_text(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_to_the_matching_extractor() {
        let text = DocumentFormat::Txt
            .extract(b"plain words")
            .expect("txt extraction");
        assert_eq!(text, "plain words");

        let error = DocumentFormat::Docx
            .extract(b"plain words")
            .expect_err("not a zip package");
        assert!(matches!(error, ExtractionError::InvalidDocx(_)));

        let error = DocumentFormat::Pdf
            .extract(b"plain words")
            .expect_err("not a pdf");
        assert!(matches!(error, ExtractionError::MalformedPdf(_)));
    }
}
