use super::ExtractionError;

/// Decode a plain-text upload as UTF-8 without further transformation.
pub(super) fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let text = String::from_utf8(bytes.to_vec())?;
    tracing::debug!(bytes = bytes.len(), chars = text.chars().count(), "Decoded text file");
    Ok(text)
}
