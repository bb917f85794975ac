//! Document summarization pipeline: dispatch, extraction, validation, and cleanup.

pub mod artifact;
mod service;
pub mod types;
pub mod validate;

pub use artifact::{CleanupError, TemporaryArtifact};
pub use service::{SummarizationPipeline, SummarizeApi, extract_upload};
pub use types::{
    ExtractedText, PipelineError, PipelineStage, Provenance, Submission, UploadedFile,
};
pub use validate::MIN_TEXT_CHARS;
