//! Settings for the reflection pipeline
//!
//! Settings are layered: built-in defaults, then an optional TOML file
//! (snake_case keys), then `RECAPITAN_*` environment variables. The host
//! application's own camelCase JSON settings are accepted as well.
//!
//! Nothing here validates values; required-value checks happen when an AI
//! service is constructed.

use crate::error::Result;
use crate::privacy::DEFAULT_PRIVATE_MARKER;
use crate::services::ollama::DEFAULT_OLLAMA_HOST;
use crate::services::openai::OPENAI_BASE_URL;
use crate::transport::DEFAULT_TIMEOUT_SECS;
use crate::types::{AiProvider, AnalysisSchedule, CommunicationStyle};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "RECAPITAN";

/// Conventional OpenAI credential variable, used when no key is configured
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Instructions for a single-note reflection
pub const DEFAULT_REFLECTION_TEMPLATE: &str = "Read the journal entry below and write a short \
reflection. Identify the main themes, the emotions behind them, and one question worth \
thinking about tomorrow. Use markdown headings for Themes, Emotions and Question.";

/// Instructions for the weekly reflection
pub const DEFAULT_WEEKLY_REFLECTION_TEMPLATE: &str = "The journal entries below cover the past \
week, one section per day in chronological order. Write a weekly reflection: recurring \
patterns, how mood and energy changed across the week, wins worth acknowledging, and two or \
three concrete suggestions for next week. Use markdown headings for Patterns, Progress and \
Next Week.";

/// Recognized configuration options
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(alias = "apiKey")]
    pub api_key: String,

    #[serde(alias = "aiProvider")]
    pub ai_provider: AiProvider,

    pub model: String,

    #[serde(alias = "reflectionTemplate")]
    pub reflection_template: String,

    #[serde(alias = "weeklyReflectionTemplate")]
    pub weekly_reflection_template: String,

    #[serde(alias = "analysisSchedule")]
    pub analysis_schedule: AnalysisSchedule,

    #[serde(alias = "communicationStyle")]
    pub communication_style: CommunicationStyle,

    #[serde(alias = "privateMarker")]
    pub private_marker: String,

    #[serde(alias = "ollamaHost")]
    pub ollama_host: String,

    /// Carried for the host; no response cache exists
    #[serde(alias = "cacheTTLMinutes")]
    pub cache_ttl_minutes: u64,

    /// Carried for the host; no response cache exists
    #[serde(alias = "cacheMaxSize")]
    pub cache_max_size: usize,

    #[serde(alias = "openaiBaseUrl")]
    pub openai_base_url: String,

    #[serde(alias = "requestTimeoutSecs")]
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            ai_provider: AiProvider::OpenAi,
            model: "gpt-4".to_string(),
            reflection_template: DEFAULT_REFLECTION_TEMPLATE.to_string(),
            weekly_reflection_template: DEFAULT_WEEKLY_REFLECTION_TEMPLATE.to_string(),
            analysis_schedule: AnalysisSchedule::Daily,
            communication_style: CommunicationStyle::Direct,
            private_marker: DEFAULT_PRIVATE_MARKER.to_string(),
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            cache_ttl_minutes: 60,
            cache_max_size: 100,
            openai_base_url: OPENAI_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };

        f.debug_struct("Settings")
            .field("api_key", &api_key)
            .field("ai_provider", &self.ai_provider)
            .field("model", &self.model)
            .field("analysis_schedule", &self.analysis_schedule)
            .field("communication_style", &self.communication_style)
            .field("private_marker", &self.private_marker)
            .field("ollama_host", &self.ollama_host)
            .field("cache_ttl_minutes", &self.cache_ttl_minutes)
            .field("cache_max_size", &self.cache_max_size)
            .field("openai_base_url", &self.openai_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Load defaults, then `file` (if given), then `RECAPITAN_*` overrides
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            debug!("Loading settings from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let mut settings: Settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        settings.fill_api_key_from_env();
        Ok(settings)
    }

    /// Parse the host application's JSON settings document (camelCase keys)
    pub fn from_json(json: &str) -> Result<Self> {
        let mut settings: Settings = serde_json::from_str(json).map_err(|e| {
            config::ConfigError::Message(format!("invalid settings JSON: {}", e))
        })?;
        settings.fill_api_key_from_env();
        Ok(settings)
    }

    fn fill_api_key_from_env(&mut self) {
        if !self.api_key.is_empty() {
            return;
        }
        if let Ok(key) = env::var(OPENAI_API_KEY_VAR) {
            if !key.is_empty() {
                debug!("Using API key from {} environment variable", OPENAI_API_KEY_VAR);
                self.api_key = key;
            }
        }
    }
}
