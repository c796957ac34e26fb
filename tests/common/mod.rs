//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use recapitan_core::{
    AiService, CommunicationStyle, FixedClock, MemoryVault, OpenAiService, RetryOptions,
};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

/// Monday 2024-01-08, 09:00 UTC
pub fn monday_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap()
}

pub fn fixed_clock(now: DateTime<Utc>) -> FixedClock {
    FixedClock(now)
}

/// Retry policy with the production shape but millisecond waits
pub fn fast_retry() -> RetryOptions {
    RetryOptions::new(3, Duration::from_millis(1), 2.0).unwrap()
}

/// OpenAI service pointed at a mock server
pub fn openai_service(server: &MockServer) -> OpenAiService {
    OpenAiService::new("sk-test".to_string(), "gpt-4".to_string())
        .expect("Failed to create OpenAI service")
        .with_base_url(format!("{}/v1", server.uri()))
        .with_retry_options(fast_retry())
}

/// Chat-completions success body
pub fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

/// Create a vault directory with the given `(relative path, content)` notes
pub fn create_test_vault(notes: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    for (path, content) in notes {
        write_note(dir.path(), path, content);
    }
    dir
}

pub fn write_note(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create note folder");
    }
    std::fs::write(full, content).expect("Failed to write note");
}

/// One recorded `analyze` call
#[derive(Debug, Clone)]
pub struct AnalyzeCall {
    pub content: String,
    pub template: String,
    pub style: CommunicationStyle,
}

/// AI service that records its prompts and answers with a fixed text
pub struct RecordingAi {
    reply: String,
    calls: Mutex<Vec<AnalyzeCall>>,
}

impl RecordingAi {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<AnalyzeCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiService for RecordingAi {
    async fn analyze(
        &self,
        content: &str,
        template: &str,
        style: CommunicationStyle,
    ) -> recapitan_core::Result<String> {
        self.calls.lock().unwrap().push(AnalyzeCall {
            content: content.to_string(),
            template: template.to_string(),
            style,
        });
        Ok(self.reply.clone())
    }

    fn provider_name(&self) -> &str {
        "recording"
    }
}

/// In-memory vault holding daily notes named `YYYY-MM-DD.md`
pub fn memory_journal(days: &[(&str, &str)]) -> MemoryVault {
    MemoryVault::with_notes(
        days.iter()
            .map(|(date, content)| (format!("{}.md", date), content.to_string())),
    )
}
