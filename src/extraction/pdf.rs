use super::ExtractionError;
use lopdf::Document;

/// Extract the text of every page, in page order.
///
/// Glyph runs on a page are joined with single spaces and pages are separated by `\n`.
/// Encrypted documents are refused rather than yielding empty text.
pub(super) fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let document = Document::load_mem(bytes).map_err(|error| {
        let message = error.to_string();
        if message.contains("encrypt") || message.contains("password") {
            ExtractionError::EncryptedPdf
        } else {
            ExtractionError::MalformedPdf(message)
        }
    })?;
    ensure_not_encrypted(&document)?;

    let pages = document.get_pages();
    let mut page_texts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        let raw = document.extract_text(&[*page_number]).map_err(|error| {
            ExtractionError::MalformedPdf(format!("page {page_number}: {error}"))
        })?;
        page_texts.push(join_runs(&raw));
    }

    let text = page_texts.join("\n");
    tracing::debug!(
        pages = pages.len(),
        chars = text.chars().count(),
        "Extracted PDF text"
    );
    Ok(text)
}

fn ensure_not_encrypted(document: &Document) -> Result<(), ExtractionError> {
    if document.is_encrypted() {
        return Err(ExtractionError::EncryptedPdf);
    }
    Ok(())
}

fn join_runs(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
