//! Core data types and error definitions for the summarization pipeline.

use crate::extraction::{DocumentFormat, ExtractionError};
use crate::processing::artifact::TemporaryArtifact;
use crate::summarization::SummarizationClientError;
use thiserror::Error;

/// Caller-provided input for one pipeline run.
#[derive(Debug)]
pub enum Submission {
    /// Text pasted directly into the request.
    Text {
        /// Raw text exactly as received.
        content: String,
    },
    /// Uploaded document staged on disk by the inbound boundary.
    File(UploadedFile),
}

impl Submission {
    /// Convenience constructor for pasted text.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }
}

/// Uploaded document together with the metadata the client declared for it.
#[derive(Debug)]
pub struct UploadedFile {
    /// Temporary artifact holding the uploaded bytes.
    pub artifact: TemporaryArtifact,
    /// File name declared in the multipart body; its extension selects the extractor.
    pub file_name: String,
    /// Content type declared in the multipart body, if any.
    pub content_type: Option<String>,
}

/// Where a piece of text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Submitted as pasted text.
    Pasted,
    /// Produced by the extractor for the given format.
    Extracted(DocumentFormat),
}

/// Text produced by the extraction stage, ready for validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Extracted or pasted text; may be empty.
    pub text: String,
    /// Producer of the text.
    pub provenance: Provenance,
}

impl ExtractedText {
    /// Wrap pasted text without modification.
    pub fn pasted(text: String) -> Self {
        Self {
            text,
            provenance: Provenance::Pasted,
        }
    }

    /// Wrap the output of a format extractor.
    pub fn extracted(text: String, format: DocumentFormat) -> Self {
        Self {
            text,
            provenance: Provenance::Extracted(format),
        }
    }
}

/// Non-terminal states of the pipeline, used to report where a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Classifying the submission and resolving the document format.
    Dispatching,
    /// Reading the upload and running the extractor.
    Extracting,
    /// Applying emptiness and length checks.
    Validating,
    /// Waiting on the summarization provider.
    Summarizing,
}

/// Errors returned by the pipeline to the inbound boundary.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Declared file name has no supported extension.
    #[error("Unsupported file type.")]
    UnsupportedFormat {
        /// File name as declared by the client.
        file_name: String,
    },
    /// Text was empty or whitespace only.
    #[error("No readable text found.")]
    EmptyContent,
    /// Trimmed text is shorter than the minimum length.
    #[error("Text is too short to summarize. Please provide at least {minimum} characters.")]
    TooShort {
        /// Character count after trimming.
        chars: usize,
        /// Required minimum character count.
        minimum: usize,
    },
    /// Extractor could not read the document.
    #[error("Failed to extract text from the document: {0}")]
    ExtractionFailure(#[from] ExtractionError),
    /// Provider failed to produce a summary.
    #[error("Error generating summary: {0}")]
    SummarizationFailure(#[from] SummarizationClientError),
}

impl PipelineError {
    /// Stage in which the pipeline failed.
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::UnsupportedFormat { .. } => PipelineStage::Dispatching,
            Self::ExtractionFailure(_) => PipelineStage::Extracting,
            Self::EmptyContent | Self::TooShort { .. } => PipelineStage::Validating,
            Self::SummarizationFailure(_) => PipelineStage::Summarizing,
        }
    }

    /// Whether the failure was caused by the submitted input rather than processing.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. } | Self::EmptyContent | Self::TooShort { .. }
        )
    }

    /// Stable, human-readable message suitable for API responses.
    pub fn message(&self) -> String {
        match self {
            Self::ExtractionFailure(_) => "Failed to extract text from the document.".into(),
            Self::SummarizationFailure(_) => "Error generating summary.".into(),
            other => other.to_string(),
        }
    }

    /// Diagnostic detail for processing failures.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::ExtractionFailure(error) => Some(error.to_string()),
            Self::SummarizationFailure(error) => Some(error.to_string()),
            _ => None,
        }
    }
}
