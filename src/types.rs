//! Core data types for the Recapitan reflection pipeline
//!
//! Journal entries as read from the vault, their redacted counterparts, and
//! the small enumerations the settings surface exposes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar date format used in journal filenames and headings
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A raw daily note, one per `YYYY-MM-DD.md` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub date: NaiveDate,
    pub content: String,
}

impl JournalEntry {
    pub fn new(date: NaiveDate, content: impl Into<String>) -> Self {
        Self {
            date,
            content: content.into(),
        }
    }

    /// ISO date string (`YYYY-MM-DD`)
    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// A journal entry with every private section removed
///
/// Derived 1:1 from a [`JournalEntry`]; the original is never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedEntry {
    pub date: NaiveDate,
    pub content: String,
}

impl SanitizedEntry {
    /// ISO date string (`YYYY-MM-DD`)
    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// Tone of the feedback requested from the AI backend
///
/// Any value other than `direct` deterministically selects `Gentle`, so a
/// misspelled setting never fails a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CommunicationStyle {
    #[default]
    Direct,
    Gentle,
}

impl CommunicationStyle {
    /// Lenient parse used for every settings source
    pub fn from_setting(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("direct") {
            CommunicationStyle::Direct
        } else {
            CommunicationStyle::Gentle
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommunicationStyle::Direct => "direct",
            CommunicationStyle::Gentle => "gentle",
        }
    }

    /// Fixed tone phrase injected into the system instruction
    pub fn tone(&self) -> &'static str {
        match self {
            CommunicationStyle::Direct => "direct and honest",
            CommunicationStyle::Gentle => "supportive and gentle",
        }
    }
}

impl From<&str> for CommunicationStyle {
    fn from(value: &str) -> Self {
        Self::from_setting(value)
    }
}

impl From<String> for CommunicationStyle {
    fn from(value: String) -> Self {
        Self::from_setting(&value)
    }
}

impl From<CommunicationStyle> for String {
    fn from(style: CommunicationStyle) -> Self {
        style.as_str().to_string()
    }
}

impl fmt::Display for CommunicationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which AI backend serves analysis requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    #[serde(alias = "OpenAI", alias = "open_ai")]
    OpenAi,
    Ollama,
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiProvider::OpenAi => write!(f, "openai"),
            AiProvider::Ollama => write!(f, "ollama"),
        }
    }
}

/// When the host should trigger analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSchedule {
    #[default]
    Daily,
    Manual,
}
