//! AI analysis services
//!
//! Callers hold an [`AiService`] trait object and never a concrete provider.
//! The provider is chosen once, from settings, by [`build_ai_service`].

pub mod ollama;
pub mod openai;

pub use ollama::OllamaService;
pub use openai::OpenAiService;

use crate::config::Settings;
use crate::error::Result;
use crate::retry::RetryOptions;
use crate::types::{AiProvider, CommunicationStyle};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Retry policy shared by every provider: 3 attempts, waits of 1s then 2s
pub fn analysis_retry_options() -> RetryOptions {
    RetryOptions::default()
}

/// Capability implemented once per AI backend
#[async_trait]
pub trait AiService: Send + Sync {
    /// Analyze `content` following `template`, in the given tone
    async fn analyze(
        &self,
        content: &str,
        template: &str,
        style: CommunicationStyle,
    ) -> Result<String>;

    /// Provider name, for logs
    fn provider_name(&self) -> &str;
}

/// System-level instruction: fixed persona, tone phrase, then the template
pub fn system_instruction(style: CommunicationStyle, template: &str) -> String {
    format!(
        "You are an insightful journaling assistant. Provide {} feedback. {}",
        style.tone(),
        template
    )
}

/// Chat message shared by the chat-style provider APIs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// The `[system, user]` message pair sent for one analysis
pub fn analysis_messages(
    content: &str,
    template: &str,
    style: CommunicationStyle,
) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_instruction(style, template)),
        ChatMessage::user(content),
    ]
}

/// Build the provider selected by `settings.ai_provider`.
///
/// Required values are validated here, before any request is made.
pub fn build_ai_service(settings: &Settings) -> Result<Arc<dyn AiService>> {
    let timeout = Duration::from_secs(settings.request_timeout_secs);

    let service: Arc<dyn AiService> = match settings.ai_provider {
        AiProvider::OpenAi => Arc::new(
            OpenAiService::new(settings.api_key.clone(), settings.model.clone())?
                .with_base_url(settings.openai_base_url.clone())
                .with_timeout(timeout)?,
        ),
        AiProvider::Ollama => Arc::new(
            OllamaService::new(settings.ollama_host.clone(), settings.model.clone())?
                .with_timeout(timeout)?,
        ),
    };

    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_system_instruction_direct() {
        assert_eq!(
            system_instruction(CommunicationStyle::Direct, "Summarize my week."),
            "You are an insightful journaling assistant. Provide direct and honest feedback. Summarize my week."
        );
    }

    #[test]
    fn test_system_instruction_unknown_style_is_gentle() {
        let instruction = system_instruction(CommunicationStyle::from("harsh"), "T");
        assert!(instruction.contains("supportive and gentle"));
    }

    #[test]
    fn test_analysis_messages_order() {
        let messages = analysis_messages("my notes", "T", CommunicationStyle::Gentle);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1], ChatMessage::user("my notes"));
    }

    #[test]
    fn test_build_selects_provider() {
        let mut settings = Settings::default();
        settings.api_key = "sk-test".to_string();
        let service = build_ai_service(&settings).unwrap();
        assert_eq!(service.provider_name(), "openai");

        settings.ai_provider = AiProvider::Ollama;
        settings.api_key.clear();
        let service = build_ai_service(&settings).unwrap();
        assert_eq!(service.provider_name(), "ollama");
    }

    #[test]
    fn test_build_fails_fast_without_key() {
        let settings = Settings::default();
        let err = build_ai_service(&settings).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
