//! Weekly analysis pipeline
//!
//! One run gathers the daily notes of the trailing week, redacts them,
//! joins them in date order under `## YYYY-MM-DD` headings, asks the AI
//! service for a reflection and stores the answer as a new note.
//!
//! Runs share no state. Note reads are issued concurrently and re-sorted
//! before aggregation, so arrival order never affects the prompt.

use crate::config::Settings;
use crate::error::{RecapitanError, Result};
use crate::journal::{is_within_window, parse_journal_date, Clock, NoteRef, Vault};
use crate::privacy::PrivacyManager;
use crate::services::AiService;
use crate::types::{CommunicationStyle, JournalEntry, SanitizedEntry, DATE_FORMAT};
use chrono::{Duration, NaiveDate};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Length of the aggregation window in days
pub const WEEK_WINDOW_DAYS: i64 = 7;

/// Join sanitized entries into the prompt document.
///
/// Each entry becomes `## <date>\n\n<content>`; entries are separated by a
/// blank line and appear in the order given.
pub fn format_entries(entries: &[SanitizedEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("## {}\n\n{}", entry.date_string(), entry.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Filename of the weekly reflection written on `date`
pub fn weekly_note_name(date: NaiveDate) -> String {
    format!("Weekly Reflection {}.md", date.format(DATE_FORMAT))
}

/// Orchestrates one weekly reflection per invocation
pub struct WeeklyAnalysisService {
    vault: Arc<dyn Vault>,
    ai: Arc<dyn AiService>,
    privacy: PrivacyManager,
    clock: Arc<dyn Clock>,
    template: String,
    style: CommunicationStyle,
}

impl WeeklyAnalysisService {
    pub fn new(
        vault: Arc<dyn Vault>,
        ai: Arc<dyn AiService>,
        privacy: PrivacyManager,
        clock: Arc<dyn Clock>,
        template: impl Into<String>,
        style: CommunicationStyle,
    ) -> Self {
        Self {
            vault,
            ai,
            privacy,
            clock,
            template: template.into(),
            style,
        }
    }

    /// Wire the pipeline from settings (weekly template, style, marker)
    pub fn from_settings(
        settings: &Settings,
        vault: Arc<dyn Vault>,
        ai: Arc<dyn AiService>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        Ok(Self::new(
            vault,
            ai,
            PrivacyManager::new(settings.private_marker.clone())?,
            clock,
            settings.weekly_reflection_template.clone(),
            settings.communication_style,
        ))
    }

    /// Run the whole pipeline and return the created note.
    ///
    /// Fails with [`RecapitanError::NoEntries`] before any AI call when the
    /// window holds no daily notes.
    pub async fn run_weekly_analysis(&self) -> Result<NoteRef> {
        let entries = self.past_week_entries().await?;
        if entries.is_empty() {
            return Err(RecapitanError::NoEntries {
                window_days: WEEK_WINDOW_DAYS,
            });
        }

        info!("Running weekly analysis over {} entries", entries.len());
        let analysis = self.analyze_weekly_content(&entries).await?;
        self.create_weekly_reflection_note(&analysis).await
    }

    /// Daily notes dated within the trailing week, oldest first
    pub async fn past_week_entries(&self) -> Result<Vec<JournalEntry>> {
        let now = self.clock.now();
        let window = Duration::days(WEEK_WINDOW_DAYS);

        let files = self.vault.list_markdown_files().await?;
        let selected: Vec<(NoteRef, NaiveDate)> = files
            .into_iter()
            .filter_map(|note| parse_journal_date(note.name()).map(|date| (note, date)))
            .filter(|(_, date)| is_within_window(*date, now, window))
            .collect();

        debug!("{} daily notes fall inside the window", selected.len());

        let mut reads = JoinSet::new();
        for (note, date) in selected {
            let vault = Arc::clone(&self.vault);
            reads.spawn(async move {
                let content = vault.read(&note).await?;
                Ok::<_, RecapitanError>((date, note, content))
            });
        }

        let mut loaded = Vec::with_capacity(reads.len());
        while let Some(joined) = reads.join_next().await {
            loaded.push(joined.map_err(std::io::Error::from)??);
        }

        // Same-day notes in different folders keep a stable order by path
        loaded.sort_by(|(a_date, a_note, _), (b_date, b_note, _)| {
            a_date.cmp(b_date).then_with(|| a_note.cmp(b_note))
        });

        Ok(loaded
            .into_iter()
            .map(|(date, _, content)| JournalEntry::new(date, content))
            .collect())
    }

    /// Redact, order and join `entries`, then ask the AI service
    pub async fn analyze_weekly_content(&self, entries: &[JournalEntry]) -> Result<String> {
        let mut sanitized: Vec<SanitizedEntry> = entries
            .iter()
            .map(|entry| self.privacy.sanitize(entry))
            .collect();
        sanitized.sort_by_key(|entry| entry.date);

        let document = format_entries(&sanitized);
        debug!(
            "Sending {} chars to {} for weekly analysis",
            document.len(),
            self.ai.provider_name()
        );

        self.ai.analyze(&document, &self.template, self.style).await
    }

    /// Store the analysis unchanged as today's weekly reflection note
    pub async fn create_weekly_reflection_note(&self, analysis: &str) -> Result<NoteRef> {
        let today = self.clock.now().date_naive();
        let note = self
            .vault
            .create_note(&weekly_note_name(today), analysis)
            .await?;

        info!("Weekly reflection written to {}", note);
        Ok(note)
    }
}
