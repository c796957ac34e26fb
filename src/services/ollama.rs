//! Ollama provider (local models via `/api/chat`)

use super::{analysis_messages, analysis_retry_options, AiService, ChatMessage};
use crate::error::{RecapitanError, Result};
use crate::retry::{retry, RetryOptions};
use crate::transport::{HttpTransport, RequestSpec, DEFAULT_TIMEOUT_SECS};
use crate::types::CommunicationStyle;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Default local Ollama address
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    message: Option<OllamaMessage>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Ollama-backed [`AiService`]
///
/// Ollama serves unauthenticated on a local host, so only the host and the
/// model are required.
pub struct OllamaService {
    model: String,
    endpoint: String,
    transport: HttpTransport,
    retry_options: RetryOptions,
}

impl OllamaService {
    pub fn new(host: String, model: String) -> Result<Self> {
        if host.trim().is_empty() {
            return Err(RecapitanError::Configuration(
                "Ollama host is required".to_string(),
            ));
        }
        if model.trim().is_empty() {
            return Err(RecapitanError::Configuration(
                "Ollama model name is required".to_string(),
            ));
        }

        Ok(Self {
            model,
            endpoint: format!("{}/api/chat", host.trim().trim_end_matches('/')),
            transport: HttpTransport::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
            retry_options: analysis_retry_options(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.transport = HttpTransport::new(timeout)?;
        Ok(self)
    }

    pub fn with_retry_options(mut self, retry_options: RetryOptions) -> Self {
        self.retry_options = retry_options;
        self
    }

    async fn chat(&self, request: &OllamaChatRequest<'_>) -> Result<String> {
        let spec = RequestSpec::post(&self.endpoint, request);
        let response: OllamaChatResponse = self.transport.send(&spec).await?;

        response
            .message
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| RecapitanError::EmptyResult("No content in response".to_string()))
    }
}

#[async_trait]
impl AiService for OllamaService {
    async fn analyze(
        &self,
        content: &str,
        template: &str,
        style: CommunicationStyle,
    ) -> Result<String> {
        debug!(
            "Requesting {} analysis from Ollama at {} (model {})",
            style, self.endpoint, self.model
        );

        let request = OllamaChatRequest {
            model: &self.model,
            messages: analysis_messages(content, template, style),
            stream: false,
        };

        let analysis = retry(|| self.chat(&request), &self.retry_options).await?;

        info!("Ollama analysis complete ({} chars)", analysis.len());
        Ok(analysis)
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }
}
