//! Abstractions for generating summaries through an external generative model.
//!
//! Each provider adapter issues a single HTTP request per summary with `reqwest`; nothing is
//! retried and the provider's text comes back verbatim. A client is built once at process start
//! from [`Config`] and shared by every request.

mod gemini;
mod ollama;
mod openai;

pub use gemini::GeminiSummarizationClient;
pub use ollama::OllamaSummarizationClient;
pub use openai::OpenAiSummarizationClient;

use crate::config::{Config, SummarizationProvider, get_config};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Instruction prepended to every document sent for summarization.
pub const SUMMARY_INSTRUCTION: &str = "Summarize the following text clearly and concisely:";

/// Errors surfaced while requesting a summary from the provider.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider was unreachable or could not be configured.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response (authentication, quota, server failure).
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Send a fully assembled prompt to the provider and return its text response.
    async fn generate_summary(&self, prompt: &str) -> Result<String, SummarizationClientError>;

    /// Summarize validated document text with the fixed instruction template.
    async fn summarize(&self, text: &str) -> Result<String, SummarizationClientError> {
        let prompt = build_prompt(text);
        self.generate_summary(&prompt).await
    }
}

/// Assemble the summarization prompt for a document.
pub fn build_prompt(text: &str) -> String {
    format!("{SUMMARY_INSTRUCTION}\n\n{text}")
}

/// Build the summarization client selected by the global configuration.
pub fn get_summarization_client() -> Result<Arc<dyn SummarizationClient>, SummarizationClientError>
{
    client_from_config(get_config())
}

/// Build the summarization client described by `config`.
pub fn client_from_config(
    config: &Config,
) -> Result<Arc<dyn SummarizationClient>, SummarizationClientError> {
    let http = build_http_client(config.summarization_timeout_secs)?;
    let base_url = config.summarization_base_url.clone();
    let model = config.summarization_model.clone();
    let api_key = || {
        config.summarization_api_key.clone().ok_or_else(|| {
            SummarizationClientError::ProviderUnavailable(format!(
                "no API key configured for {:?}",
                config.summarization_provider
            ))
        })
    };

    tracing::info!(
        provider = ?config.summarization_provider,
        model = %model,
        "Initializing summarization client"
    );
    let client: Arc<dyn SummarizationClient> = match config.summarization_provider {
        SummarizationProvider::Gemini => Arc::new(GeminiSummarizationClient::new(
            http,
            base_url,
            api_key()?,
            model,
        )),
        SummarizationProvider::OpenAI => Arc::new(OpenAiSummarizationClient::new(
            http,
            base_url,
            api_key()?,
            model,
        )),
        SummarizationProvider::Ollama => {
            Arc::new(OllamaSummarizationClient::new(http, base_url, model))
        }
    };
    Ok(client)
}

fn build_http_client(timeout_secs: u64) -> Result<Client, SummarizationClientError> {
    Client::builder()
        .user_agent(concat!("docsum/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|error| {
            SummarizationClientError::ProviderUnavailable(format!(
                "failed to construct HTTP client: {error}"
            ))
        })
}

/// Turn a non-success HTTP response into a [`SummarizationClientError::GenerationFailed`].
async fn error_from_response(provider: &str, response: reqwest::Response) -> SummarizationClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    SummarizationClientError::GenerationFailed(format!("{provider} returned {status}: {body}"))
}
