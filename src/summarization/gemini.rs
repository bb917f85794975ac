use super::{SummarizationClient, SummarizationClientError, error_from_response};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiSummarizationClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiSummarizationClient {
    /// Create a client bound to one model.
    pub fn new(http: Client, base_url: String, api_key: String, model: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[async_trait]
impl SummarizationClient for GeminiSummarizationClient {
    async fn generate_summary(&self, prompt: &str) -> Result<String, SummarizationClientError> {
        let payload = json!({
            "contents": [
                { "role": "user", "parts": [{ "text": prompt }] }
            ]
        });

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "Requesting Gemini summary");
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach Gemini at {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            return Err(error_from_response("Gemini", response).await);
        }

        let body: GenerateContentResponse = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode Gemini response: {error}"
            ))
        })?;

        let Some(candidate) = body.candidates.into_iter().next() else {
            let reason = body
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason)
                .unwrap_or_else(|| "no candidates returned".into());
            return Err(SummarizationClientError::InvalidResponse(format!(
                "Gemini returned no summary: {reason}"
            )));
        };

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.is_empty() {
            return Err(SummarizationClientError::InvalidResponse(
                "Gemini candidate contained no text".into(),
            ));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn client(server: &MockServer) -> GeminiSummarizationClient {
        GeminiSummarizationClient::new(
            Client::builder()
                .user_agent("docsum-test")
                .build()
                .expect("client"),
            server.base_url(),
            "test-key".into(),
            "gemini-1.5-flash".into(),
        )
    }

    #[tokio::test]
    async fn joins_candidate_parts() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-1.5-flash:generateContent")
                    .header("x-goog-api-key", "test-key")
                    .body_contains("Summarize this");
                then.status(200).json_body(json!({
                    "candidates": [{
                        "content": {
                            "role": "model",
                            "parts": [{ "text": "First half. " }, { "text": "Second half." }]
                        },
                        "finishReason": "STOP"
                    }]
                }));
            })
            .await;

        let summary = client(&server)
            .generate_summary("Summarize this")
            .await
            .expect("summary");

        mock.assert_async().await;
        assert_eq!(summary, "First half. Second half.");
    }

    #[tokio::test]
    async fn maps_auth_failures_to_generation_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(403).body("API key not valid");
            })
            .await;

        let error = client(&server)
            .generate_summary("prompt")
            .await
            .expect_err("forbidden");

        assert!(
            matches!(&error, SummarizationClientError::GenerationFailed(message) if message.contains("403") && message.contains("API key not valid")),
            "{error}"
        );
    }

    #[tokio::test]
    async fn blocked_prompt_is_an_invalid_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({
                    "promptFeedback": { "blockReason": "SAFETY" }
                }));
            })
            .await;

        let error = client(&server)
            .generate_summary("prompt")
            .await
            .expect_err("blocked");

        assert!(
            matches!(&error, SummarizationClientError::InvalidResponse(message) if message.contains("SAFETY")),
            "{error}"
        );
    }

    #[tokio::test]
    async fn unreachable_provider_is_unavailable() {
        let client = GeminiSummarizationClient::new(
            Client::new(),
            "http://127.0.0.1:1".into(),
            "key".into(),
            "gemini-1.5-flash".into(),
        );

        let error = client.generate_summary("prompt").await.expect_err("no server");
        assert!(matches!(error, SummarizationClientError::ProviderUnavailable(_)));
    }
}
