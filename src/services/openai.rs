//! OpenAI chat-completions provider

use super::{analysis_messages, analysis_retry_options, AiService, ChatMessage};
use crate::error::{RecapitanError, Result};
use crate::retry::{retry, RetryOptions};
use crate::transport::{HttpTransport, RequestSpec, DEFAULT_TIMEOUT_SECS};
use crate::types::CommunicationStyle;
use async_trait::async_trait;
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Public OpenAI API base URL
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-backed [`AiService`]
pub struct OpenAiService {
    api_key: SecretString,
    model: String,
    endpoint: String,
    transport: HttpTransport,
    retry_options: RetryOptions,
}

impl OpenAiService {
    /// Create a service for `model`, authenticating with `api_key`.
    ///
    /// Fails immediately when either value is empty.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(RecapitanError::Configuration(
                "OpenAI API key is required".to_string(),
            ));
        }
        if model.trim().is_empty() {
            return Err(RecapitanError::Configuration(
                "OpenAI model name is required".to_string(),
            ));
        }
        if HeaderValue::from_str(&api_key).is_err() {
            return Err(RecapitanError::Configuration(
                "OpenAI API key contains invalid characters".to_string(),
            ));
        }

        Ok(Self {
            api_key: SecretString::new(api_key.into()),
            model,
            endpoint: chat_endpoint(OPENAI_BASE_URL),
            transport: HttpTransport::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
            retry_options: analysis_retry_options(),
        })
    }

    /// Point at an OpenAI-compatible API (e.g. a proxy)
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.endpoint = chat_endpoint(base_url.as_ref());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.transport = HttpTransport::new(timeout)?;
        Ok(self)
    }

    pub fn with_retry_options(mut self, retry_options: RetryOptions) -> Self {
        self.retry_options = retry_options;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One completion round-trip, no retry
    async fn complete(&self, request: &ChatCompletionRequest<'_>) -> Result<String> {
        let spec = RequestSpec::post(&self.endpoint, request).bearer(self.api_key.expose_secret())?;
        let response: ChatCompletionResponse = self.transport.send(&spec).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| RecapitanError::EmptyResult("No content in response".to_string()))
    }
}

fn chat_endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

#[async_trait]
impl AiService for OpenAiService {
    async fn analyze(
        &self,
        content: &str,
        template: &str,
        style: CommunicationStyle,
    ) -> Result<String> {
        debug!(
            "Requesting {} analysis from OpenAI ({} chars, model {})",
            style,
            content.len(),
            self.model
        );

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: analysis_messages(content, template, style),
        };

        let analysis = retry(|| self.complete(&request), &self.retry_options).await?;

        info!("OpenAI analysis complete ({} chars)", analysis.len());
        Ok(analysis)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_retry() -> RetryOptions {
        RetryOptions::new(3, Duration::from_millis(1), 2.0).unwrap()
    }

    fn service(server: &MockServer) -> OpenAiService {
        OpenAiService::new("sk-test".to_string(), "gpt-4".to_string())
            .unwrap()
            .with_base_url(format!("{}/v1/", server.uri()))
            .with_retry_options(fast_retry())
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let err = OpenAiService::new(String::new(), "gpt-4".to_string())
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_empty_model_rejected() {
        let err = OpenAiService::new("sk-test".to_string(), "  ".to_string())
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("model"));
    }

    #[test]
    fn test_endpoint_normalization() {
        assert_eq!(
            chat_endpoint("https://api.openai.com/v1/"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_analyze_sends_expected_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({
                "model": "gpt-4",
                "messages": [
                    {
                        "role": "system",
                        "content": "You are an insightful journaling assistant. Provide direct and honest feedback. Reflect."
                    },
                    { "role": "user", "content": "Today I shipped." }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Well done.")))
            .expect(1)
            .mount(&server)
            .await;

        let analysis = service(&server)
            .analyze("Today I shipped.", "Reflect.", CommunicationStyle::Direct)
            .await
            .unwrap();

        assert_eq!(analysis, "Well done.");
    }

    #[tokio::test]
    async fn test_empty_choices_is_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let err = service(&server)
            .analyze("notes", "T", CommunicationStyle::Gentle)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EmptyResult);
    }

    #[tokio::test]
    async fn test_null_content_is_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": null } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = service(&server)
            .analyze("notes", "T", CommunicationStyle::Gentle)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EmptyResult);
    }

    #[tokio::test]
    async fn test_missing_choices_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "x" })))
            .expect(1)
            .mount(&server)
            .await;

        let err = service(&server)
            .analyze("notes", "T", CommunicationStyle::Gentle)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_server_errors_retried_three_times() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let err = service(&server)
            .analyze("notes", "T", CommunicationStyle::Direct)
            .await
            .unwrap_err();

        assert!(matches!(err, RecapitanError::HttpStatus { code: 503, .. }));
    }

    #[tokio::test]
    async fn test_auth_failure_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": { "message": "Incorrect API key provided" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = service(&server)
            .analyze("notes", "T", CommunicationStyle::Direct)
            .await
            .unwrap_err();

        assert!(matches!(err, RecapitanError::HttpStatus { code: 401, .. }));
    }

    #[tokio::test]
    async fn test_rate_limit_then_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Recovered.")))
            .expect(1)
            .mount(&server)
            .await;

        let analysis = service(&server)
            .analyze("notes", "T", CommunicationStyle::Direct)
            .await
            .unwrap();

        assert_eq!(analysis, "Recovered.");
    }
}
