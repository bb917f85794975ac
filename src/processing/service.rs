//! Pipeline orchestrator: dispatch, extraction, validation, summarization, and cleanup.

use crate::{
    extraction::{DocumentFormat, ExtractionError},
    processing::{
        artifact::TemporaryArtifact,
        types::{ExtractedText, PipelineError, PipelineStage, Submission, UploadedFile},
        validate::validate,
    },
    summarization::SummarizationClient,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Runs one submission through the full pipeline.
///
/// The pipeline owns a long-lived handle to the summarization client and nothing else; it keeps
/// no state between runs. Construct it once near process start and share it through an `Arc`.
pub struct SummarizationPipeline {
    summarizer: Arc<dyn SummarizationClient>,
}

/// Abstraction over the pipeline used by external surfaces (HTTP, CLI).
#[async_trait]
pub trait SummarizeApi: Send + Sync {
    /// Produce a summary for the submission, releasing any uploaded file before returning.
    async fn summarize(&self, submission: Submission) -> Result<String, PipelineError>;
}

impl SummarizationPipeline {
    /// Build a pipeline around an already-initialized summarization client.
    pub fn new(summarizer: Arc<dyn SummarizationClient>) -> Self {
        Self { summarizer }
    }

    /// Run a submission to a terminal state.
    pub async fn run(&self, submission: Submission) -> Result<String, PipelineError> {
        let outcome = match submission {
            Submission::Text { content } => {
                tracing::debug!(stage = ?PipelineStage::Dispatching, chars = content.len(), "Received pasted text");
                self.summarize_text(ExtractedText::pasted(content)).await
            }
            Submission::File(UploadedFile {
                artifact,
                file_name,
                content_type,
            }) => {
                tracing::debug!(
                    stage = ?PipelineStage::Dispatching,
                    file_name = %file_name,
                    content_type = ?content_type,
                    "Received uploaded file"
                );
                let outcome = self
                    .process_upload(&artifact, &file_name, content_type.as_deref())
                    .await;
                artifact.release().await;
                outcome
            }
        };

        match &outcome {
            Ok(summary) => tracing::info!(summary_chars = summary.len(), "Summary generated"),
            Err(error) => tracing::info!(stage = ?error.stage(), error = %error, "Pipeline failed"),
        }
        outcome
    }

    async fn process_upload(
        &self,
        artifact: &TemporaryArtifact,
        file_name: &str,
        content_type: Option<&str>,
    ) -> Result<String, PipelineError> {
        let format = DocumentFormat::from_file_name(file_name).ok_or_else(|| {
            PipelineError::UnsupportedFormat {
                file_name: file_name.to_string(),
            }
        })?;
        if let Some(content_type) = content_type {
            if !format.accepts_content_type(content_type) {
                tracing::warn!(
                    file_name,
                    content_type,
                    %format,
                    "Declared content type disagrees with extension; dispatching by extension"
                );
            }
        }

        let extracted = extract_upload(artifact, format).await?;
        self.summarize_text(extracted).await
    }

    async fn summarize_text(&self, extracted: ExtractedText) -> Result<String, PipelineError> {
        let extracted = validate(extracted)?;
        tracing::debug!(
            stage = ?PipelineStage::Summarizing,
            provenance = ?extracted.provenance,
            chars = extracted.text.len(),
            "Requesting summary"
        );
        let summary = self.summarizer.summarize(&extracted.text).await?;
        Ok(summary)
    }
}

#[async_trait]
impl SummarizeApi for SummarizationPipeline {
    async fn summarize(&self, submission: Submission) -> Result<String, PipelineError> {
        self.run(submission).await
    }
}

/// Read an artifact back and run the extractor on the blocking pool.
pub async fn extract_upload(
    artifact: &TemporaryArtifact,
    format: DocumentFormat,
) -> Result<ExtractedText, ExtractionError> {
    let bytes = artifact.read().await?;
    tracing::debug!(stage = ?PipelineStage::Extracting, %format, bytes = bytes.len(), "Extracting text");
    let text = tokio::task::spawn_blocking(move || format.extract(&bytes))
        .await
        .map_err(|error| ExtractionError::Interrupted(error.to_string()))??;
    Ok(ExtractedText::extracted(text, format))
}
