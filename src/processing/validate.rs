//! Emptiness and minimum-length checks applied before any provider call.

use super::types::{ExtractedText, PipelineError};

/// Minimum number of characters, after trimming, required for summarization.
pub const MIN_TEXT_CHARS: usize = 100;

/// Validate extracted or pasted text.
///
/// Trimming is only used for the checks; the returned text is the untrimmed original.
pub fn validate(extracted: ExtractedText) -> Result<ExtractedText, PipelineError> {
    let trimmed = extracted.text.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::EmptyContent);
    }

    let chars = trimmed.chars().count();
    if chars < MIN_TEXT_CHARS {
        return Err(PipelineError::TooShort {
            chars,
            minimum: MIN_TEXT_CHARS,
        });
    }

    Ok(extracted)
}
